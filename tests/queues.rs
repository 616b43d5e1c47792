mod common;

use std::sync::mpsc;

use common::{_accounts, _id_is, _open_client, _people, _prepare_store, WAIT};
use tabula_engine::{Error, InitTableArgs, LookupQuery, ModificationQuery, Row, row};

#[test]
fn queue_runs_in_submission_order() {
    let store = _prepare_store();
    let client = _open_client(&store);
    client.init_table(_accounts()).wait().unwrap();

    let pending: Vec<_> = (0..20)
        .map(|n| client.modify(ModificationQuery::insert("accounts", vec![n.into(), (n * 10).into()])))
        .collect();
    for result in pending {
        assert_eq!(result.wait().unwrap().rows_affected, 1);
    }

    let rows = client
        .get_all(LookupQuery::all("accounts", ["id"]))
        .wait()
        .unwrap();
    let expected: Vec<Row> = (0..20).map(|n| row![n]).collect();
    assert_eq!(rows, expected);
}

#[test]
fn queue_init_twice_exactly_one_wins() {
    let store = _prepare_store();
    let client = _open_client(&store);

    let first = client.init_table(InitTableArgs::new("x", ["id"], vec![]));
    let second = client.init_table(InitTableArgs::new("x", ["id"], vec![]));

    let results = [first.wait(), second.wait()];
    let created = results.iter().filter(|result| result.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|result| matches!(result, Err(Error::TableAlreadyExists { .. })))
        .count();

    assert_eq!(created, 1);
    assert_eq!(rejected, 1);
}

#[test]
fn queue_callbacks_receive_results() {
    let store = _prepare_store();
    let client = _open_client(&store);
    let (sender, receiver) = mpsc::channel();

    let init_sender = sender.clone();
    client.init_table_with(_people(), move |result| {
        init_sender.send(format!("init {}", result.is_ok())).unwrap();
    });
    assert_eq!(receiver.recv_timeout(WAIT).unwrap(), "init true");

    let get_sender = sender.clone();
    client.get_with(LookupQuery::new("people", ["id", "name"], _id_is(2)), move |result| {
        get_sender.send(format!("get {}", result.unwrap())).unwrap();
    });
    assert_eq!(receiver.recv_timeout(WAIT).unwrap(), "get 2 | Bonega");

    let all_sender = sender.clone();
    client.get_all_with(LookupQuery::all("people", ["name"]), move |result| {
        all_sender.send(format!("all {}", result.unwrap().len())).unwrap();
    });
    assert_eq!(receiver.recv_timeout(WAIT).unwrap(), "all 3");

    client.modify_with(
        ModificationQuery::delete("people", ["id"], |_: &Row| true),
        move |result| {
            sender.send(format!("delete {}", result.unwrap().rows_affected)).unwrap();
        },
    );
    assert_eq!(receiver.recv_timeout(WAIT).unwrap(), "delete 1");
}

#[test]
fn queue_failure_does_not_stop_worker() {
    let store = _prepare_store();
    let client = _open_client(&store);
    client.init_table(_people()).wait().unwrap();

    let missing = client.modify(ModificationQuery::insert("ghosts", vec![1.into()]));
    let ragged = client.modify(ModificationQuery::insert("people", vec![1.into()]));
    let valid = client.modify(ModificationQuery::insert("people", vec![4.into(), "Lorem".into()]));

    assert!(matches!(missing.wait(), Err(Error::TableNotFound { .. })));
    assert!(matches!(ragged.wait(), Err(Error::SchemaMismatch { .. })));
    assert_eq!(valid.wait().unwrap().rows_affected, 1);

    let no_match = client.get(LookupQuery::new("people", ["id"], _id_is(99))).wait();
    assert!(matches!(no_match, Err(Error::NoMatch { .. })));

    let found = client.get(LookupQuery::new("people", ["id", "name"], _id_is(4))).wait();
    assert_eq!(found.unwrap(), row![4, "Lorem"]);
}

#[test]
fn queue_callback_can_use_a_session() {
    let store = _prepare_store();
    let client = _open_client(&store);
    let session = client.open_session(Some("inside"));
    let (sender, receiver) = mpsc::channel();

    client.init_table_with(_people(), move |result| {
        result.unwrap();
        let rows = session.get_all(LookupQuery::all("people", ["id"])).unwrap();
        sender.send(rows.len()).unwrap();
    });

    assert_eq!(receiver.recv_timeout(WAIT).unwrap(), 3);
}

#[test]
fn queue_and_session_share_tables() {
    let store = _prepare_store();
    let client = _open_client(&store);
    let session = client.open_session(None);

    session.init_table(_people()).unwrap();
    client
        .modify(ModificationQuery::update("people", ["name"], vec!["Rango".into()], _id_is(1)))
        .wait()
        .unwrap();

    assert_eq!(
        session.get(LookupQuery::new("people", ["name"], |_: &Row| true)).unwrap(),
        row!["Rango"]
    );
}

#[test]
fn close_drains_queued_commands() {
    let store = _prepare_store();

    {
        let client = _open_client(&store);
        client.init_table(_accounts()).wait().unwrap();

        for n in 0..10 {
            // results are dropped; the commands must run anyway
            let _ = client.modify(ModificationQuery::insert("accounts", vec![n.into(), 0.into()]));
        }
        client.close().unwrap();
    }

    let client = _open_client(&store);
    let snapshot = client.snapshot().unwrap();
    assert_eq!(snapshot.find_table("accounts").unwrap().len(), 10);
    assert_eq!(client.queued().total(), 0);
}

#[test]
fn pending_wait_timeout_returns_result() {
    let store = _prepare_store();
    let client = _open_client(&store);

    let pending = client.init_table(_people());
    let result = pending.wait_timeout(WAIT);

    assert!(matches!(result, Some(Ok(()))));
}
