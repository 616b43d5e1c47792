//! The `tabula` command line: a thin harness around a [`Client`] that opens
//! one store file, runs a single command and closes the store again.

use colored::Colorize;

use crate::{
    cli::{
        colors::TABULA_SLATE,
        messages::{highlight_argument, system_message},
        parsers::{CliCommand, CliParser, CliSettings},
    },
    engine::{InitTableArgs, LookupQuery, ModificationQuery},
    error::{Error, Result},
    persistence::{JsonFile, Row, Value},
    row,
    sessions::{Client, ClientConfig},
};

mod colors;
mod messages;
pub mod parsers;

pub use messages::error_message;

const DEMO_TABLE: &str = "test";

pub fn run(parser: CliParser) -> Result<()> {
    let settings = CliSettings::resolve(&parser);
    let file = JsonFile::new(&settings.name, &settings.path);
    let config = ClientConfig::default()
        .with_poll_interval(settings.poll_interval)
        .with_queues(parser.command.needs_queues());
    let client = Client::with_config(file, config)?;

    println!(
        "{}",
        system_message(
            "tabula",
            format!(
                "Opened store at '{}'.",
                highlight_argument(&settings.path.display().to_string())
            )
        )
    );

    let outcome = match parser.command {
        CliCommand::Tables => list_tables(&client),
        CliCommand::Show { table } => show_table(&client, &table),
        CliCommand::Demo => run_demo(&client),
    };

    // close even when the command failed; its error is the one reported
    let closed = client.close();
    outcome.and(closed)
}

fn list_tables(client: &Client) -> Result<()> {
    let store = client.snapshot()?;

    if store.is_empty() {
        println!("{}", system_message("tabula", "The store has no tables.".to_string()));
        return Ok(());
    }

    println!();
    println!("{:20} {}", "TABLE".color(TABULA_SLATE), "ROWS");
    for table in store.tables() {
        println!("{:20} {}", table.name().color(TABULA_SLATE), table.len());
    }

    Ok(())
}

fn show_table(client: &Client, name: &str) -> Result<()> {
    let store = client.snapshot()?;
    let table = store.find_table(name)?;

    println!();
    println!("{}", table);
    Ok(())
}

fn run_demo(client: &Client) -> Result<()> {
    //! Create the `test` table, change its first row through a session, then
    //! add and read back a row through the queues.

    let session = client.open_session(Some("demo"));
    println!(
        "{}",
        system_message(
            "demo",
            format!(
                "Session '{}' opened at '{}'.",
                highlight_argument(session.id()),
                highlight_argument(&session.start_time_string())
            )
        )
    );

    let args = InitTableArgs::new(DEMO_TABLE, ["id", "name", "desc"], vec![row![0, "Test", "None"]]);
    match session.init_table(args) {
        Ok(()) => println!("{}", system_message("demo", "Table created.".to_string())),
        Err(Error::TableAlreadyExists { .. }) => println!(
            "{}",
            system_message("demo", "Table exists already, reusing it.".to_string())
        ),
        Err(err) => return Err(err),
    }

    let update = ModificationQuery::update(
        DEMO_TABLE,
        ["id", "desc"],
        vec![1.into(), "Hes cool i guess".into()],
        |row: &Row| row.at(0).and_then(Value::as_i64) == Some(0),
    );
    let outcome = session.modify(update)?;
    println!("{}", system_message("session", format!("{}.", outcome)));

    let next_id = client.snapshot()?.find_table(DEMO_TABLE)?.len() + 1;
    let insert = client.modify(ModificationQuery::insert(
        DEMO_TABLE,
        vec![next_id.into(), "Queued".into(), "via the modify worker".into()],
    ));
    println!("{}", system_message("queue", format!("{}.", insert.wait()?)));

    let rows = client
        .get_all(LookupQuery::all(DEMO_TABLE, ["id", "name", "desc"]))
        .wait()?;
    println!("{}", system_message("queue", format!("{} row(s) read back:", rows.len())));
    for row in rows {
        println!("    {}", row);
    }

    Ok(())
}
