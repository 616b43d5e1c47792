use clap::Parser;
use tabula_engine::cli::{self, parsers::CliParser};

fn main() {
    let parser = CliParser::parse();

    if let Err(err) = cli::run(parser) {
        eprintln!("{}", cli::error_message(&err));
        std::process::exit(1);
    }
}
