//! The one serialization point every caller goes through.
//!
//! Queue workers and sessions all reach the in-memory [`TableStore`] through
//! a [`SharedStore`]. A single mutex guards both the tables and the durable
//! store handle, and is held for exactly one engine call plus the save that
//! follows it.

use log::{error, info};
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::persistence::{DurableStore, TableStore};

/// When an engine call should be followed by a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Persist {
    /// Save whatever the outcome, to flush store-wide metadata.
    Always,
    /// Save only when the call changed something.
    IfDirty,
}

struct StoreState {
    tables: Option<TableStore>,
    file: Box<dyn DurableStore>,
}

pub(crate) struct SharedStore {
    state: Mutex<StoreState>,
}

impl SharedStore {
    pub(crate) fn open(mut file: Box<dyn DurableStore>) -> Result<SharedStore> {
        let tables = file.open()?;

        Ok(SharedStore {
            state: Mutex::new(StoreState {
                tables: Some(tables),
                file,
            }),
        })
    }

    pub(crate) fn execute<T, F>(&self, persist: Persist, op: F) -> Result<T>
    where
        F: FnOnce(&mut TableStore) -> Result<T>,
    {
        //! Run `op` against the tables under the store lock, then save.
        //!
        //! An operation error wins over a save error. A save error after a
        //! successful operation comes back as [`Error::Durability`]; the
        //! change stays applied in memory either way.

        let mut state = self.state.lock();
        let StoreState { tables, file } = &mut *state;
        let tables = tables.as_mut().ok_or(Error::StoreNotOpen)?;

        let result = op(&mut *tables);

        if persist == Persist::IfDirty && !tables.is_dirty() {
            return result;
        }

        let saved = file.save(tables);
        if saved.is_ok() {
            tables.mark_clean();
        }

        match (result, saved) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(Error::Durability {
                source: Box::new(err),
            }),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(save_err)) => {
                error!("save failed after a failed operation ({}): {}", err, save_err);
                Err(err)
            }
        }
    }

    pub(crate) fn snapshot(&self) -> Result<TableStore> {
        //! A copy of the tables as they are right now.

        let state = self.state.lock();
        state.tables.clone().ok_or(Error::StoreNotOpen)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().tables.is_some()
    }

    pub(crate) fn close(&self) -> Result<()> {
        //! Flush the tables, release the durable store and drop the tables.
        //!
        //! Closing a closed store is a no-op. The durable store is closed
        //! even when the final flush fails.

        let mut state = self.state.lock();
        let Some(tables) = state.tables.take() else {
            return Ok(());
        };

        let flushed = state.file.save(&tables);
        let closed = state.file.close();
        info!("store '{}' closed", tables.name());

        flushed.and(closed)
    }
}
