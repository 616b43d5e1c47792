//! The synchronous way into a store. A [`Session`] runs every call straight
//! through the engine on the caller's thread and persists before returning,
//! skipping the client's queues entirely.
//!
//! # Sharing
//! All sessions of a client, and the client's queue workers, work on the same
//! tables. They take turns through one lock, so a session call never sees a
//! half applied command from a worker, and a write made through a session is
//! visible to the very next session read.
//!
//! # Lifetime
//! Sessions are handed out by [`super::Client::open_session`] and are reused
//! per id. Closing one through [`super::Client::close_session`] flushes the
//! store and releases the durable store for everyone sharing it. Nothing is
//! closed implicitly when a [`Session`] value goes out of scope; use
//! [`super::Client::with_session`] for a scope that always closes.

use std::{sync::Arc, time::SystemTime};

use chrono::{DateTime, Local};
use log::debug;

use crate::engine::{self, InitTableArgs, LookupQuery, ModificationQuery, ModifyOutcome};
use crate::error::Result;
use crate::persistence::{Row, TableStore};

use super::shared::{Persist, SharedStore};

struct SessionInner {
    id: String,
    start_time: SystemTime,
    store: Arc<SharedStore>,
}

/// A handle on one opened session. Clones refer to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub(crate) fn new(id: &str, store: &Arc<SharedStore>) -> Session {
        Session {
            inner: Arc::new(SessionInner {
                id: id.to_string(),
                start_time: SystemTime::now(),
                store: Arc::clone(store),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn same_as(&self, other: &Session) -> bool {
        //! True when both handles came from the same open call.

        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn start_time_string(&self) -> String {
        //! When the session was opened, in local time.

        let datetime: DateTime<Local> = self.inner.start_time.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn init_table(&self, args: InitTableArgs) -> Result<()> {
        //! Create a table. Fails if the name is taken.

        debug!("session {}: init table '{}'", self.id(), args.name);
        self.inner
            .store
            .execute(Persist::IfDirty, |tables| engine::init_table(tables, args))
    }

    pub fn modify(&self, query: ModificationQuery) -> Result<ModifyOutcome> {
        //! Run an insert, delete or update and persist the store, whether
        //! the query succeeded or not.

        debug!("session {}: {} on '{}'", self.id(), query.kind, query.table);
        self.inner
            .store
            .execute(Persist::Always, |tables| engine::modify(tables, query))
    }

    pub fn get(&self, query: LookupQuery) -> Result<Row> {
        self.inner
            .store
            .execute(Persist::IfDirty, |tables| engine::get(tables, &query))
    }

    pub fn get_all(&self, query: LookupQuery) -> Result<Vec<Row>> {
        self.inner
            .store
            .execute(Persist::IfDirty, |tables| engine::get_all(tables, &query))
    }

    pub fn snapshot(&self) -> Result<TableStore> {
        //! A copy of every table as it is right now.

        self.inner.store.snapshot()
    }

    pub(crate) fn close(&self) -> Result<()> {
        self.inner.store.close()
    }
}
