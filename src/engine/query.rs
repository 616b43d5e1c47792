use std::fmt::Display;

use crate::persistence::{Row, Value};

/// A caller supplied test that selects rows.
///
/// Predicates must be total: the engine runs them while holding the store
/// lock, so one that never returns stalls every queue and session.
pub type Predicate = Box<dyn Fn(&Row) -> bool + Send>;

fn _keys<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Vec<String> {
    keys.into_iter().map(Into::into).collect()
}

/// Create a table with initial rows.
pub struct InitTableArgs {
    pub name: String,
    pub keys: Vec<String>,
    pub rows: Vec<Row>,
}

impl InitTableArgs {
    pub fn new<S: Into<String>>(
        name: &str,
        keys: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) -> InitTableArgs {
        InitTableArgs {
            name: name.to_string(),
            keys: _keys(keys),
            rows,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModificationKind {
    Insert,
    Delete,
    Update,
}

impl Display for ModificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ModificationKind::Insert => "INSERT",
            ModificationKind::Delete => "DELETE",
            ModificationKind::Update => "UPDATE",
        };
        write!(f, "{}", kind)
    }
}

/// A single insert, delete or update against one table.
///
/// - Insert: `data` is a full row, `keys` and `predicate` are unused.
/// - Delete: `keys` decide which columns make a row reachable, `predicate`
/// picks the row.
/// - Update: `data[i]` is written to column `keys[i]` of every row the
/// `predicate` accepts.
pub struct ModificationQuery {
    pub table: String,
    pub kind: ModificationKind,
    pub keys: Vec<String>,
    pub predicate: Predicate,
    pub data: Vec<Value>,
}

impl ModificationQuery {
    pub fn insert(table: &str, data: Vec<Value>) -> ModificationQuery {
        ModificationQuery {
            table: table.to_string(),
            kind: ModificationKind::Insert,
            keys: vec![],
            predicate: Box::new(|_| true),
            data,
        }
    }

    pub fn delete<S, F>(table: &str, keys: impl IntoIterator<Item = S>, predicate: F) -> ModificationQuery
    where
        S: Into<String>,
        F: Fn(&Row) -> bool + Send + 'static,
    {
        ModificationQuery {
            table: table.to_string(),
            kind: ModificationKind::Delete,
            keys: _keys(keys),
            predicate: Box::new(predicate),
            data: vec![],
        }
    }

    pub fn update<S, F>(
        table: &str,
        keys: impl IntoIterator<Item = S>,
        data: Vec<Value>,
        predicate: F,
    ) -> ModificationQuery
    where
        S: Into<String>,
        F: Fn(&Row) -> bool + Send + 'static,
    {
        ModificationQuery {
            table: table.to_string(),
            kind: ModificationKind::Update,
            keys: _keys(keys),
            predicate: Box::new(predicate),
            data,
        }
    }
}

/// A projection of some keys of one table, filtered by a predicate that
/// sees the projected row.
pub struct LookupQuery {
    pub table: String,
    pub keys: Vec<String>,
    pub predicate: Predicate,
}

impl LookupQuery {
    pub fn new<S, F>(table: &str, keys: impl IntoIterator<Item = S>, predicate: F) -> LookupQuery
    where
        S: Into<String>,
        F: Fn(&Row) -> bool + Send + 'static,
    {
        LookupQuery {
            table: table.to_string(),
            keys: _keys(keys),
            predicate: Box::new(predicate),
        }
    }

    pub fn all<S: Into<String>>(table: &str, keys: impl IntoIterator<Item = S>) -> LookupQuery {
        //! Select every row.

        LookupQuery::new(table, keys, |_| true)
    }
}

/// What a successful modification did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifyOutcome {
    pub kind: ModificationKind,
    pub rows_affected: usize,
}

impl Display for ModifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} row(s)", self.kind, self.rows_affected)
    }
}
