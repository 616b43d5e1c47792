use super::row::Row;
use crate::error::{Error, Result};

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A named list of rows sharing one ordered list of keys.
///
/// The short serde names keep the persisted document compact; the whole
/// store is rewritten on every save. A loaded table goes through
/// [`Table::new`], so a document with ragged rows is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableDocument")]
pub struct Table {
    #[serde(rename = "n")]
    name: String,
    #[serde(rename = "k")]
    keys: Vec<String>,
    #[serde(rename = "r")]
    rows: Vec<Row>,
}

/// A table as it is found in a store document, before any checks.
#[derive(Deserialize)]
struct TableDocument {
    n: String,
    k: Vec<String>,
    r: Vec<Row>,
}

impl TryFrom<TableDocument> for Table {
    type Error = Error;

    fn try_from(document: TableDocument) -> Result<Table> {
        Table::new(document.n, document.k, document.r)
    }
}

impl Table {
    pub fn new(name: String, keys: Vec<String>, rows: Vec<Row>) -> Result<Table> {
        //! Return a new table with the said keys and initial rows.
        //!
        //! Every row must carry exactly one value per key, otherwise a
        //! [`Error::SchemaMismatch`] is returned and nothing is built.

        if let Some(row) = rows.iter().find(|row| row.len() != keys.len()) {
            return Err(Error::SchemaMismatch {
                table: name,
                expected: keys.len(),
                actual: row.len(),
            });
        }

        Ok(Table { name, keys, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn resolve_columns(&self, requested: &[String]) -> Vec<usize> {
        //! Indices of the table's keys that appear in `requested`.
        //!
        //! Indices come back in the table's key order, each at most once.
        //! Requested keys the table does not have are dropped.

        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| requested.contains(key))
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.keys.len() {
            return Err(Error::SchemaMismatch {
                table: self.name.clone(),
                expected: self.keys.len(),
                actual: row.len(),
            });
        }

        self.rows.push(row);
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows.iter().map(|row| format!("{}", row)).collect();

        writeln!(f, "{}\n{}", self.keys.join(" | "), rows.join("\n"))
    }
}
