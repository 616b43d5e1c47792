//! Mutating half of the engine: table creation, insert, delete and update.
//!
//! Every function checks its preconditions before it writes anything, so a
//! failed call leaves the store exactly as it found it.

use log::debug;

use crate::error::{Error, Result};
use crate::persistence::{Row, Table, TableStore};

use super::query::{InitTableArgs, ModificationKind, ModificationQuery, ModifyOutcome};

pub fn init_table(store: &mut TableStore, args: InitTableArgs) -> Result<()> {
    let InitTableArgs { name, keys, rows } = args;
    store.create_table(&name, keys, rows)
}

pub fn modify(store: &mut TableStore, query: ModificationQuery) -> Result<ModifyOutcome> {
    //! Run one [`ModificationQuery`] against its table.
    //!
    //! The store is only marked as updated when the query succeeds.

    let kind = query.kind;
    let table = store.find_table_mut(&query.table)?;

    let rows_affected = match kind {
        ModificationKind::Insert => insert(table, query)?,
        ModificationKind::Delete => delete(table, &query),
        ModificationKind::Update => update(table, &query)?,
    };

    store.touch();
    Ok(ModifyOutcome {
        kind,
        rows_affected,
    })
}

fn insert(table: &mut Table, query: ModificationQuery) -> Result<usize> {
    table.push(Row(query.data))?;
    Ok(1)
}

fn delete(table: &mut Table, query: &ModificationQuery) -> usize {
    //! Remove the last row accepted by the predicate.
    //!
    //! Only a single row is ever removed, even when several match. Rows are
    //! only reachable when at least one of the query keys exists in the
    //! table; with none resolved nothing is deleted.

    let indices = table.resolve_columns(&query.keys);
    debug!(
        "delete on '{}': resolved columns {:?}",
        table.name(),
        indices
    );

    if indices.is_empty() {
        return 0;
    }

    let target = table.rows().iter().rposition(|row| (query.predicate)(row));

    match target {
        Some(row_index) => {
            debug!("delete on '{}': removing row {}", table.name(), row_index);
            table.rows_mut().remove(row_index);
            1
        }
        None => 0,
    }
}

fn update(table: &mut Table, query: &ModificationQuery) -> Result<usize> {
    //! Overwrite the query keys of every row accepted by the predicate.
    //!
    //! Matching happens against the rows as they were before the call; all
    //! pending writes are computed first and applied afterwards.

    if query.data.len() != query.keys.len() {
        return Err(Error::SchemaMismatch {
            table: table.name().to_string(),
            expected: query.keys.len(),
            actual: query.data.len(),
        });
    }

    // (column in the table, position in the payload)
    let pairs: Vec<(usize, usize)> = table
        .resolve_columns(&query.keys)
        .into_iter()
        .filter_map(|column| {
            let key = &table.keys()[column];
            query
                .keys
                .iter()
                .position(|k| k == key)
                .map(|payload| (column, payload))
        })
        .collect();
    debug!("update on '{}': resolved pairs {:?}", table.name(), pairs);

    if pairs.is_empty() {
        return Ok(0);
    }

    let matched: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| (query.predicate)(row))
        .map(|(index, _)| index)
        .collect();
    debug!("update on '{}': matched rows {:?}", table.name(), matched);

    let rows = table.rows_mut();
    for &row_index in matched.iter() {
        for &(column, payload) in pairs.iter() {
            rows[row_index].0[column] = query.data[payload].clone();
        }
    }

    Ok(matched.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Value;
    use crate::row;

    fn _prepare_store() -> TableStore {
        let mut store = TableStore::new("test_db");
        init_table(
            &mut store,
            InitTableArgs::new(
                "people",
                ["id", "name"],
                vec![row![1, "Jansen"], row![2, "Bonega"], row![3, "Jansen"]],
            ),
        )
        .unwrap();
        store.mark_clean();
        store
    }

    fn _rows(store: &TableStore) -> Vec<Row> {
        store.find_table("people").unwrap().rows().to_vec()
    }

    #[test]
    fn insert_appends_payload() {
        let mut store = _prepare_store();

        let outcome = modify(&mut store, ModificationQuery::insert("people", vec![4.into(), "Lorem".into()])).unwrap();

        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(_rows(&store).last(), Some(&row![4, "Lorem"]));
        assert!(store.is_dirty());
    }

    #[test]
    fn insert_wrong_width_leaves_rows() {
        let mut store = _prepare_store();

        let result = modify(&mut store, ModificationQuery::insert("people", vec![4.into()]));

        assert!(matches!(result, Err(Error::SchemaMismatch { expected: 2, actual: 1, .. })));
        assert_eq!(_rows(&store).len(), 3);
        assert!(!store.is_dirty());
    }

    #[test]
    fn modify_missing_table() {
        let mut store = _prepare_store();

        let result = modify(&mut store, ModificationQuery::insert("ghosts", vec![]));
        assert!(matches!(result, Err(Error::TableNotFound { .. })));
    }

    #[test]
    fn delete_removes_last_match_only() {
        let mut store = _prepare_store();
        let query = ModificationQuery::delete("people", ["name"], |row: &Row| {
            row.at(1) == Some(&Value::from("Jansen"))
        });

        let outcome = modify(&mut store, query).unwrap();

        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(_rows(&store), vec![row![1, "Jansen"], row![2, "Bonega"]]);
    }

    #[test]
    fn delete_without_match_is_noop() {
        let mut store = _prepare_store();
        let query = ModificationQuery::delete("people", ["id"], |row: &Row| {
            row.at(0) == Some(&Value::from(99))
        });

        let outcome = modify(&mut store, query).unwrap();

        assert_eq!(outcome.rows_affected, 0);
        assert_eq!(_rows(&store).len(), 3);
    }

    #[test]
    fn delete_with_unknown_keys_is_noop() {
        let mut store = _prepare_store();
        let query = ModificationQuery::delete("people", ["nope"], |_: &Row| true);

        assert_eq!(modify(&mut store, query).unwrap().rows_affected, 0);
        assert_eq!(_rows(&store).len(), 3);
    }

    #[test]
    fn update_changes_every_match() {
        let mut store = _prepare_store();
        let query = ModificationQuery::update(
            "people",
            ["name"],
            vec!["Maharashtra".into()],
            |row: &Row| row.at(1) == Some(&Value::from("Jansen")),
        );

        let outcome = modify(&mut store, query).unwrap();

        assert_eq!(outcome.rows_affected, 2);
        assert_eq!(
            _rows(&store),
            vec![row![1, "Maharashtra"], row![2, "Bonega"], row![3, "Maharashtra"]]
        );
    }

    #[test]
    fn update_pairs_keys_with_payload_positions() {
        let mut store = _prepare_store();
        // keys in a different order than the table's
        let query = ModificationQuery::update(
            "people",
            ["name", "id"],
            vec!["Lorem".into(), 20.into()],
            |row: &Row| row.at(0) == Some(&Value::from(2)),
        );

        modify(&mut store, query).unwrap();

        assert_eq!(_rows(&store)[1], row![20, "Lorem"]);
    }

    #[test]
    fn update_matches_against_snapshot() {
        let mut store = _prepare_store();
        // would match row 1 after row 0 was rewritten if writes were interleaved
        let query = ModificationQuery::update(
            "people",
            ["id"],
            vec![2.into()],
            |row: &Row| row.at(0) == Some(&Value::from(1)),
        );

        assert_eq!(modify(&mut store, query).unwrap().rows_affected, 1);
        assert_eq!(_rows(&store)[1], row![2, "Bonega"]);
    }

    #[test]
    fn update_wrong_payload_width() {
        let mut store = _prepare_store();
        let query = ModificationQuery::update("people", ["id", "name"], vec![5.into()], |_: &Row| true);

        assert!(matches!(
            modify(&mut store, query),
            Err(Error::SchemaMismatch { expected: 2, actual: 1, .. })
        ));
        assert_eq!(_rows(&store)[0], row![1, "Jansen"]);
    }
}
