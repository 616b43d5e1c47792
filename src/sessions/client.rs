use std::{sync::Arc, time::Duration};

use indexmap::IndexMap;
use log::{error, info, warn};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::engine::{InitTableArgs, LookupQuery, ModificationQuery, ModifyOutcome};
use crate::error::{Error, Result};
use crate::persistence::{DurableStore, Row, TableStore};
use crate::queues::{Callback, Pending, QueueDepths, Scheduler};

use super::session::Session;
use super::shared::SharedStore;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Knobs for a [`Client`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// How long an idle queue worker sleeps before looking again.
    pub poll_interval: Duration,
    /// Start the queue workers. Without them only sessions can reach the
    /// store, and queued submissions fail with [`Error::QueuesDisabled`].
    pub queued: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            poll_interval: DEFAULT_POLL_INTERVAL,
            queued: true,
        }
    }
}

impl ClientConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> ClientConfig {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_queues(mut self, queued: bool) -> ClientConfig {
        self.queued = queued;
        self
    }
}

/// The long lived owner of an open store.
///
/// A [`Client`] opens the durable store, holds the tables in memory and runs
/// the four queue workers. Work reaches the tables two ways:
/// - queued: `init_table`, `modify`, `get`, `get_all` (and their `_with`
/// callback forms) return immediately and complete later on a worker;
/// - direct: a [`Session`] from [`Client::open_session`] runs calls on the
/// caller's thread.
///
/// Both paths go through the same lock, one engine call at a time. A client
/// configured without queues starts no worker threads and serves sessions
/// only.
///
/// # Issues
/// - Once the store is closed through a session the client cannot reopen it;
/// a new [`Client`] has to be built.
pub struct Client {
    store: Arc<SharedStore>,
    scheduler: Option<Scheduler>,
    sessions: Mutex<IndexMap<String, Session>>,
}

/// Closes its session when dropped, unless it was closed already.
struct SessionGuard<'c> {
    client: &'c Client,
    session: Option<Session>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = self.client.close_session(session) {
                error!("failed to close session on scope exit: {}", err);
            }
        }
    }
}

impl Client {
    pub fn open(file: impl DurableStore + 'static) -> Result<Client> {
        //! Open `file` with the default [`ClientConfig`].

        Client::with_config(file, ClientConfig::default())
    }

    pub fn with_config(file: impl DurableStore + 'static, config: ClientConfig) -> Result<Client> {
        //! Open `file`, load its tables and start the queue workers unless
        //! `config` turns them off.

        let store = Arc::new(SharedStore::open(Box::new(file))?);
        let scheduler = if config.queued {
            let scheduler = Scheduler::start(&store, config.poll_interval)?;
            info!(
                "client started with a poll interval of {:?}",
                config.poll_interval
            );
            Some(scheduler)
        } else {
            info!("client started without command queues");
            None
        };

        Ok(Client {
            store,
            scheduler,
            sessions: Mutex::new(IndexMap::new()),
        })
    }

    pub fn is_open(&self) -> bool {
        self.store.is_open()
    }

    pub fn is_queued(&self) -> bool {
        //! Whether the queue workers are running.

        self.scheduler.is_some()
    }

    pub fn snapshot(&self) -> Result<TableStore> {
        self.store.snapshot()
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub fn open_session(&self, session_id: Option<&str>) -> Session {
        //! Get the session with this id, creating it on first use.
        //!
        //! Without an id a fresh random one is generated.

        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut sessions = self.sessions.lock();
        sessions
            .entry(session_id)
            .or_insert_with_key(|id| {
                info!("opening session {}", id);
                Session::new(id, &self.store)
            })
            .clone()
    }

    pub fn close_session(&self, session: Session) -> Result<()> {
        //! Flush the store, release the durable store and forget the session.
        //!
        //! The tables are shared, so every other session and the queue
        //! workers get [`crate::Error::StoreNotOpen`] from here on.

        self.sessions.lock().shift_remove(session.id());
        info!("closing session {}", session.id());
        session.close()
    }

    pub fn with_session<R, F>(&self, session_id: Option<&str>, f: F) -> Result<R>
    where
        F: FnOnce(&Session) -> R,
    {
        //! Run `f` with a session that is closed on the way out, whether `f`
        //! returns or unwinds.

        let session = self.open_session(session_id);
        let mut guard = SessionGuard {
            client: self,
            session: Some(session.clone()),
        };

        let output = f(&session);

        guard.session = None;
        self.close_session(session)?;

        Ok(output)
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }

    // ------------------------------------------------------------------
    // Queued operations
    // ------------------------------------------------------------------

    fn dispatch<T, S>(&self, on_complete: Callback<T>, submit: S)
    where
        S: FnOnce(&Scheduler, Callback<T>),
    {
        //! Hand the command to its queue, or fail it right away when the
        //! client runs without queues.

        match &self.scheduler {
            Some(scheduler) => submit(scheduler, on_complete),
            None => {
                warn!("queued command rejected: {}", Error::QueuesDisabled);
                on_complete(Err(Error::QueuesDisabled));
            }
        }
    }

    pub fn init_table_with<F>(&self, args: InitTableArgs, on_complete: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.dispatch::<(), _>(Box::new(on_complete), |scheduler, callback| {
            scheduler.submit_init_table(args, callback)
        });
    }

    pub fn modify_with<F>(&self, query: ModificationQuery, on_complete: F)
    where
        F: FnOnce(Result<ModifyOutcome>) + Send + 'static,
    {
        self.dispatch::<ModifyOutcome, _>(Box::new(on_complete), |scheduler, callback| {
            scheduler.submit_modify(query, callback)
        });
    }

    pub fn get_with<F>(&self, query: LookupQuery, on_complete: F)
    where
        F: FnOnce(Result<Row>) + Send + 'static,
    {
        self.dispatch::<Row, _>(Box::new(on_complete), |scheduler, callback| {
            scheduler.submit_get(query, callback)
        });
    }

    pub fn get_all_with<F>(&self, query: LookupQuery, on_complete: F)
    where
        F: FnOnce(Result<Vec<Row>>) + Send + 'static,
    {
        self.dispatch::<Vec<Row>, _>(Box::new(on_complete), |scheduler, callback| {
            scheduler.submit_get_all(query, callback)
        });
    }

    pub fn init_table(&self, args: InitTableArgs) -> Pending<()> {
        let (callback, pending) = Pending::channel();
        self.dispatch(callback, |scheduler, callback| {
            scheduler.submit_init_table(args, callback)
        });
        pending
    }

    pub fn modify(&self, query: ModificationQuery) -> Pending<ModifyOutcome> {
        let (callback, pending) = Pending::channel();
        self.dispatch(callback, |scheduler, callback| {
            scheduler.submit_modify(query, callback)
        });
        pending
    }

    pub fn get(&self, query: LookupQuery) -> Pending<Row> {
        let (callback, pending) = Pending::channel();
        self.dispatch(callback, |scheduler, callback| {
            scheduler.submit_get(query, callback)
        });
        pending
    }

    pub fn get_all(&self, query: LookupQuery) -> Pending<Vec<Row>> {
        let (callback, pending) = Pending::channel();
        self.dispatch(callback, |scheduler, callback| {
            scheduler.submit_get_all(query, callback)
        });
        pending
    }

    pub fn queued(&self) -> QueueDepths {
        //! Commands still waiting for their worker. All zero without queues.

        self.scheduler
            .as_ref()
            .map(Scheduler::depths)
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    pub fn close(mut self) -> Result<()> {
        //! Let the workers finish every queued command, then flush and
        //! close the store.

        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.shutdown();
        }
        self.sessions.lock().clear();
        self.store.close()
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!("failed to close store while dropping client: {}", err);
        }
    }
}
