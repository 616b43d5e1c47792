use log::debug;

use crate::error::{Error, Result};
use crate::persistence::{Row, Table, TableStore};

use super::query::LookupQuery;

fn project<'t>(table: &'t Table, query: &LookupQuery) -> impl Iterator<Item = Row> + 't {
    //! Yield every row of `table` reduced to the query's keys, in the
    //! table's key order.

    let indices = table.resolve_columns(&query.keys);
    table.rows().iter().map(move |row| row.project(&indices))
}

pub fn get(store: &TableStore, query: &LookupQuery) -> Result<Row> {
    //! Return the first projected row the predicate accepts.
    //!
    //! Tables are scanned in creation order and the scan stops at the first
    //! hit. A missing table and a table with no matching row both end in
    //! [`Error::NoMatch`].

    for table in store.tables().filter(|table| table.name() == query.table) {
        if let Some(row) = project(table, query).find(|row| (query.predicate)(row)) {
            debug!("get on '{}': matched [{}]", table.name(), row);
            return Ok(row);
        }
    }

    Err(Error::NoMatch {
        table: query.table.clone(),
    })
}

pub fn get_all(store: &TableStore, query: &LookupQuery) -> Result<Vec<Row>> {
    //! Return every projected row the predicate accepts, in row order.
    //!
    //! An empty result is a success; only a missing table is an error.

    let table = store.find_table(&query.table)?;
    let rows: Vec<Row> = project(table, query)
        .filter(|row| (query.predicate)(row))
        .collect();

    debug!("get_all on '{}': {} row(s) matched", table.name(), rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{InitTableArgs, init_table};
    use crate::persistence::Value;
    use crate::row;

    fn _prepare_store() -> TableStore {
        let mut store = TableStore::new("test_db");
        init_table(
            &mut store,
            InitTableArgs::new(
                "test",
                ["id", "name", "desc"],
                vec![row![0, "Test", "None"], row![1, "Jimmy", "Rango"], row![2, "Jimmy", "Danish"]],
            ),
        )
        .unwrap();
        store
    }

    #[test]
    fn get_returns_first_projected_match() {
        let store = _prepare_store();
        let query = LookupQuery::new("test", ["desc", "name"], |row: &Row| {
            row.at(0) == Some(&Value::from("Jimmy"))
        });

        // projection follows the table's key order, not the query's
        assert_eq!(get(&store, &query).unwrap(), row!["Jimmy", "Rango"]);
    }

    #[test]
    fn get_drops_unknown_keys() {
        let store = _prepare_store();
        let query = LookupQuery::all("test", ["id", "missing"]);

        assert_eq!(get(&store, &query).unwrap(), row![0]);
    }

    #[test]
    fn get_without_match() {
        let store = _prepare_store();
        let query = LookupQuery::new("test", ["id"], |_: &Row| false);
        assert!(matches!(get(&store, &query), Err(Error::NoMatch { .. })));

        let query = LookupQuery::all("missing", ["id"]);
        assert!(matches!(get(&store, &query), Err(Error::NoMatch { .. })));
    }

    #[test]
    fn get_all_collects_in_row_order() {
        let store = _prepare_store();
        let query = LookupQuery::new("test", ["id", "name"], |row: &Row| {
            row.at(1) == Some(&Value::from("Jimmy"))
        });

        assert_eq!(
            get_all(&store, &query).unwrap(),
            vec![row![1, "Jimmy"], row![2, "Jimmy"]]
        );
    }

    #[test]
    fn get_all_empty_is_not_missing() {
        let store = _prepare_store();

        let query = LookupQuery::new("test", ["id"], |_: &Row| false);
        assert_eq!(get_all(&store, &query).unwrap(), Vec::<Row>::new());

        let query = LookupQuery::all("missing", ["id"]);
        assert!(matches!(get_all(&store, &query), Err(Error::TableNotFound { .. })));
    }
}
