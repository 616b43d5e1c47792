//! Errors raised by the engine, the queues and the durable store.
//!
//! A single enum keeps the callback signatures simple: every completion
//! receives a [`Result`] with the same error type, whether the failure came
//! from the table logic or from the file underneath.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A table with this name was already created in the store.
    #[error("table '{table}' already exists")]
    TableAlreadyExists { table: String },

    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },

    /// The number of values handed to an insert, update or table
    /// initialization does not line up with the keys they target.
    #[error("schema mismatch on table '{table}': expected {expected} value(s), got {actual}")]
    SchemaMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A single-row lookup scanned everything and found nothing.
    #[error("no row in table '{table}' matched the lookup")]
    NoMatch { table: String },

    #[error("store is not open")]
    StoreNotOpen,

    #[error("store at '{}' is already open", .path.display())]
    AlreadyOpen { path: PathBuf },

    /// The operation was applied in memory but could not be written out.
    /// Durability of the change is unknown.
    #[error("applied in memory, durability unknown: {source}")]
    Durability {
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The completion of a queued command was dropped before it ran.
    #[error("queue worker went away before completing the command")]
    WorkerGone,

    /// A queued command was submitted to a client started without queues.
    #[error("client was opened without command queues")]
    QueuesDisabled,
}

impl Error {
    pub fn is_recoverable(&self) -> bool {
        //! Engine failures leave the store untouched and usable. Everything
        //! else points at the store or its file.

        matches!(
            self,
            Error::TableAlreadyExists { .. }
                | Error::TableNotFound { .. }
                | Error::SchemaMismatch { .. }
                | Error::NoMatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
