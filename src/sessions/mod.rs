//! Sessions and the client that owns them.
//!
//! The [`Client`] is the process wide anchor of an open store: it owns the
//! tables, the durable store and the queue workers. A [`Session`] is the
//! synchronous way to the same tables.

mod client;
mod session;
pub(crate) mod shared;

pub use client::{Client, ClientConfig};
pub use session::Session;
