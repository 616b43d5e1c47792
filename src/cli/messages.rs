//! Message formatting for the command line.
//!
//! - Highlight Text (make the text slate but not bold)
//! - System messages, tagged with where they came from
//! - Error messages

use colored::Colorize;

use crate::cli::colors::{TABULA_AMBER, TABULA_SLATE};
use crate::error::Error;

pub fn highlight_argument(argument: &str) -> String {
    //! Color a piece of text, like a path or a session id, in slate so it
    //! stands out from the message around it.
    //!
    //! Returns the formatted string.

    format!("{}", argument.color(TABULA_SLATE))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Tag `message` with a padded, bold source name like `[tabula]`.

    let source_formatted = format!("{:6}", source_name.color(TABULA_SLATE).bold());
    format!("[{}] {}", source_formatted, message)
}

pub fn error_message(error: &Error) -> String {
    //! Format an [`Error`] for the terminal, tagged with a bold amber
    //! `[error]` so it reads apart from the system messages.
    //!
    //! Used by the binary for whatever ended the run.

    let source_formatted = format!("{:6}", "error".color(TABULA_AMBER).bold());
    format!("[{}] {}", source_formatted, error)
}
