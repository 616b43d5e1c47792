//! The durable side of a store: something that can hand out a whole
//! [`TableStore`] when opened and take one back to persist.
//!
//! The engine never looks inside the persisted bytes. [`JsonFile`] is the
//! implementation shipped with the crate; it keeps the store as a base64
//! wrapped JSON document in a single file.

use std::{
    collections::HashSet,
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use log::{debug, info};
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::store::TableStore;

/// Paths currently held open by a [`JsonFile`] in this process.
static OPEN_PATHS: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Load and persist a whole [`TableStore`].
pub trait DurableStore: Send {
    /// Load the persisted store, or initialize an empty one.
    ///
    /// Fails with [`Error::AlreadyOpen`] while the store is open.
    fn open(&mut self) -> Result<TableStore>;

    /// Overwrite the persisted state with `store`. Does nothing while closed.
    fn save(&mut self, store: &TableStore) -> Result<()>;

    /// Make the store unavailable for saves until it is opened again.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;
}

/// A store file holding `base64(json(TableStore))`.
pub struct JsonFile {
    name: String,
    path: PathBuf,
    open: bool,
}

impl JsonFile {
    pub fn new(name: &str, path: impl AsRef<Path>) -> JsonFile {
        JsonFile {
            name: name.to_string(),
            path: path.as_ref().to_path_buf(),
            open: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_key(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    fn tmp_path(&self) -> PathBuf {
        //! The sibling a save is staged in: the full file name plus `.tmp`,
        //! so stores sharing a stem never share a staging file.

        let mut file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    fn write(&self, store: &TableStore) -> Result<()> {
        //! Encode and write the store next to the target, then rename it into
        //! place so a reader never sees a half written file.

        let json = serde_json::to_vec(store)?;
        let encoded = STANDARD.encode(json);

        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!("saved store '{}' to {}", store.name(), self.path.display());
        Ok(())
    }

    fn read(&self) -> Result<TableStore> {
        //! Decode the file. Tables with ragged rows or a repeated name fail
        //! here, before anything can run against them.

        let encoded = fs::read_to_string(&self.path)?;
        let json = STANDARD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl DurableStore for JsonFile {
    fn open(&mut self) -> Result<TableStore> {
        if self.open {
            return Err(Error::AlreadyOpen {
                path: self.path.clone(),
            });
        }

        let key = self.lock_key();
        if !OPEN_PATHS.lock().insert(key.clone()) {
            return Err(Error::AlreadyOpen { path: key });
        }

        let loaded = if self.path.exists() {
            self.read()
        } else {
            info!("initializing new store '{}' at {}", self.name, self.path.display());
            let store = TableStore::new(&self.name);
            self.write(&store).map(|_| store)
        };

        match loaded {
            Ok(store) => {
                self.open = true;
                info!(
                    "opened store '{}' with {} table(s)",
                    store.name(),
                    store.len()
                );
                Ok(store)
            }
            Err(err) => {
                OPEN_PATHS.lock().remove(&key);
                Err(err)
            }
        }
    }

    fn save(&mut self, store: &TableStore) -> Result<()> {
        if !self.open {
            return Ok(());
        }

        self.write(store)
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }

        self.open = false;
        OPEN_PATHS.lock().remove(&self.lock_key());
        info!("closed store at {}", self.path.display());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for JsonFile {
    fn drop(&mut self) {
        if self.open {
            OPEN_PATHS.lock().remove(&self.lock_key());
        }
    }
}
