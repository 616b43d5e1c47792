#![allow(dead_code)]

use std::{path::PathBuf, time::Duration};

use tabula_engine::{Client, ClientConfig, InitTableArgs, JsonFile, Row, Value, row};
use tempfile::TempDir;

pub const POLL: Duration = Duration::from_millis(2);
pub const WAIT: Duration = Duration::from_secs(5);

/// A store file in its own temporary directory. The directory goes away
/// with the value, so keep it alive for as long as the file is used.
pub struct TestStore {
    pub dir: TempDir,
    pub path: PathBuf,
}

pub fn _prepare_store() -> TestStore {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("test.jsondb");
    TestStore { dir, path }
}

pub fn _open_client(store: &TestStore) -> Client {
    let config = ClientConfig::default().with_poll_interval(POLL);
    Client::with_config(JsonFile::new("test_db", &store.path), config).expect("failed to open client")
}

pub fn _open_sync_client(store: &TestStore) -> Client {
    let config = ClientConfig::default().with_queues(false);
    Client::with_config(JsonFile::new("test_db", &store.path), config).expect("failed to open client")
}

pub fn _accounts() -> InitTableArgs {
    InitTableArgs::new("accounts", ["id", "balance"], vec![])
}

pub fn _people() -> InitTableArgs {
    InitTableArgs::new(
        "people",
        ["id", "name"],
        vec![row![1, "Jansen"], row![2, "Bonega"], row![3, "Maharashtra"]],
    )
}

pub fn _id_is(id: i64) -> impl Fn(&Row) -> bool + Send + 'static {
    move |row: &Row| row.at(0).and_then(Value::as_i64) == Some(id)
}
