//! Command line arguments and the settings resolved from them.
//!
//! Every setting can come from three places, highest priority first:
//! an argument, an environment variable (a `.env` file is loaded when
//! present), or the built-in default.

use std::{env, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

const DEFAULT_PATH: &str = "tabula.jsondb";
const DEFAULT_NAME: &str = "tabula";
const DEFAULT_POLL_MS: u64 = 25;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Inspect and exercise a tabula store file", long_about = None)]
pub struct CliParser {
    /// Store file to open [env: TABULA_PATH]
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Store name used when the file is created [env: TABULA_NAME]
    #[arg(long)]
    pub name: Option<String>,

    /// Idle polling interval of the queue workers [env: TABULA_POLL_MS]
    #[arg(long)]
    pub poll_ms: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Clone, Subcommand)]
pub enum CliCommand {
    /// List tables with their row counts.
    Tables,

    /// Print the keys and rows of one table.
    Show { table: String },

    /// Create a `test` table and update it through a session and the queues.
    Demo,
}

impl CliCommand {
    pub fn needs_queues(&self) -> bool {
        //! Only the demo submits queued commands; the rest read a snapshot.

        matches!(self, CliCommand::Demo)
    }
}

/// Where the store lives and how the client should run.
#[derive(Debug, PartialEq)]
pub struct CliSettings {
    pub path: PathBuf,
    pub name: String,
    pub poll_interval: Duration,
}

impl CliSettings {
    pub fn resolve(parser: &CliParser) -> CliSettings {
        // a missing .env is the common case
        let _ = dotenvy::dotenv();

        CliSettings::from_sources(parser, |key| env::var(key).ok())
    }

    fn from_sources(parser: &CliParser, lookup: impl Fn(&str) -> Option<String>) -> CliSettings {
        let path = parser
            .path
            .clone()
            .or_else(|| lookup("TABULA_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));

        let name = parser
            .name
            .clone()
            .or_else(|| lookup("TABULA_NAME"))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let poll_ms = parser
            .poll_ms
            .or_else(|| lookup("TABULA_POLL_MS").and_then(|ms| ms.parse().ok()))
            .unwrap_or(DEFAULT_POLL_MS);

        CliSettings {
            path,
            name,
            poll_interval: Duration::from_millis(poll_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_beat_environment() {
        let parser = CliParser::parse_from(["tabula", "--path", "a.jsondb", "tables"]);
        let settings = CliSettings::from_sources(&parser, |key| match key {
            "TABULA_PATH" => Some("b.jsondb".to_string()),
            "TABULA_POLL_MS" => Some("40".to_string()),
            _ => None,
        });

        assert_eq!(settings.path, PathBuf::from("a.jsondb"));
        assert_eq!(settings.name, DEFAULT_NAME);
        assert_eq!(settings.poll_interval, Duration::from_millis(40));
    }

    #[test]
    fn only_demo_needs_queues() {
        assert!(CliParser::parse_from(["tabula", "demo"]).command.needs_queues());
        assert!(!CliParser::parse_from(["tabula", "tables"]).command.needs_queues());
        assert!(!CliParser::parse_from(["tabula", "show", "test"]).command.needs_queues());
    }

    #[test]
    fn bad_poll_value_falls_back() {
        let parser = CliParser::parse_from(["tabula", "show", "test"]);
        let settings = CliSettings::from_sources(&parser, |key| match key {
            "TABULA_POLL_MS" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(settings.poll_interval, Duration::from_millis(DEFAULT_POLL_MS));
        assert!(matches!(parser.command, CliCommand::Show { ref table } if table == "test"));
    }
}
