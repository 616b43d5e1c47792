use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persistence::Row;

use super::table::Table;

/// The collective of all [`Table`] objects of one store file.
///
/// A [`TableStore`] is the unit of truth while a client has the store open.
/// It is loaded whole from the durable store and written back whole after
/// every mutation, so it carries its own timestamps rather than relying on
/// file metadata.
///
/// Tables are kept in an [`IndexMap`] so lookups scan them in the order they
/// were created. On disk they are a plain list in that same order, each table
/// carrying its own name; a document naming one table twice does not load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableStore {
    #[serde(rename = "n")]
    name: String,
    #[serde(rename = "ca")]
    created_at: DateTime<Utc>,
    #[serde(rename = "lua")]
    last_updated_at: DateTime<Utc>,
    #[serde(rename = "t", with = "table_list")]
    tables: IndexMap<String, Table>,
    #[serde(skip)]
    dirty: bool,
}

impl TableStore {
    pub fn new(name: &str) -> TableStore {
        //! Create a new store with no tables.

        let now = Utc::now();
        TableStore {
            name: name.to_string(),
            created_at: now,
            last_updated_at: now,
            tables: IndexMap::new(),
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    pub fn create_table(&mut self, name: &str, keys: Vec<String>, rows: Vec<Row>) -> Result<()> {
        //! Create a [`Table`] and append it to the store.
        //!
        //! Fails without touching the store when the name is taken or when
        //! one of the initial rows does not match the keys.

        if self.tables.contains_key(name) {
            return Err(Error::TableAlreadyExists {
                table: name.to_string(),
            });
        }

        let table = Table::new(name.to_string(), keys, rows)?;
        debug!(
            "creating table '{}' with keys [{}] and {} row(s)",
            name,
            table.keys().join(", "),
            table.len()
        );

        self.tables.insert(name.to_string(), table);
        self.touch();

        Ok(())
    }

    pub fn find_table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).ok_or_else(|| Error::TableNotFound {
            table: name.to_string(),
        })
    }

    pub(crate) fn find_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables.get_mut(name).ok_or_else(|| Error::TableNotFound {
            table: name.to_string(),
        })
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn touch(&mut self) {
        //! Record a mutation: bump the update time and flag the store for
        //! the next save.

        self.last_updated_at = Utc::now();
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

mod table_list {
    //! `IndexMap<name, Table>` as a list of tables, keyed again on load.

    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::Table;

    pub(super) fn serialize<S>(tables: &IndexMap<String, Table>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(tables.values())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, Table>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Table>::deserialize(deserializer)?;

        let mut tables = IndexMap::with_capacity(list.len());
        for table in list {
            let name = table.name().to_string();
            if tables.contains_key(&name) {
                return Err(D::Error::custom(format!("table '{}' appears more than once", name)));
            }
            tables.insert(name, table);
        }

        Ok(tables)
    }
}
