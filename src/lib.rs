//! # tabula_engine
//!
//! A tiny embedded table store. Named tables of keyed rows live in memory
//! and are written whole to a single file after every change.
//!
//! ```text
//!   Session (sync) ─────────────┐
//!                               ▼
//!   Client queues ──► workers ──► SharedStore lock ──► engine ──► TableStore
//!   (init, modify,                                                  │
//!    get, get all)                                                  ▼
//!                                                             DurableStore
//! ```
//!
//! - [`persistence`]: values, rows, tables, the store and its file
//! - [`engine`]: the insert/delete/update/get logic
//! - [`queues`]: the four background command queues
//! - [`sessions`]: [`Client`] and [`Session`]

pub mod cli;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod queues;
pub mod sessions;

pub use engine::{InitTableArgs, LookupQuery, ModificationKind, ModificationQuery, ModifyOutcome};
pub use error::{Error, Result};
pub use persistence::{DurableStore, JsonFile, Row, Table, TableStore, Value};
pub use queues::{Pending, QueueDepths};
pub use sessions::{Client, ClientConfig, Session};
