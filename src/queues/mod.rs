//! The command queue scheduler.
//!
//! Four FIFO queues, one per kind of operation, each drained by its own
//! worker thread:
//!
//! | Queue | Worker | Persists |
//! |---|---|---|
//! | init table | `tabula-init` | when a table was created |
//! | modify | `tabula-modify` | always, even on failure |
//! | get | `tabula-get` | only if something left the store dirty |
//! | get all | `tabula-get-all` | only if something left the store dirty |
//!
//! Commands in one queue run in submission order. Nothing orders commands
//! of different queues against each other: an insert and a get submitted
//! together may run either way round. Callers needing read-your-write should
//! use a [`crate::sessions::Session`] for that pair.

mod command;
mod worker;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use log::{error, warn};

use crate::engine::{self, InitTableArgs, LookupQuery, ModificationQuery, ModifyOutcome};
use crate::error::Result;
use crate::persistence::{Row, TableStore};
use crate::sessions::shared::{Persist, SharedStore};

pub use command::{Callback, Pending};

use command::Command;
use worker::{CommandQueue, spawn_worker};

type InitQueue = CommandQueue<Command<InitTableArgs, ()>>;
type ModifyQueue = CommandQueue<Command<ModificationQuery, ModifyOutcome>>;
type GetQueue = CommandQueue<Command<LookupQuery, Row>>;
type GetAllQueue = CommandQueue<Command<LookupQuery, Vec<Row>>>;

/// How many commands wait in each queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueDepths {
    pub init_table: usize,
    pub modify: usize,
    pub get: usize,
    pub get_all: usize,
}

impl QueueDepths {
    pub fn total(&self) -> usize {
        self.init_table + self.modify + self.get + self.get_all
    }
}

pub(crate) struct Scheduler {
    init: Arc<InitQueue>,
    modify: Arc<ModifyQueue>,
    get: Arc<GetQueue>,
    get_all: Arc<GetAllQueue>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

fn run<A, T, F>(store: &SharedStore, queue: &str, persist: Persist, command: Command<A, T>, op: F)
where
    F: FnOnce(&mut TableStore, A) -> Result<T>,
{
    //! Execute one command under the store lock, then complete it once the
    //! lock is released.

    let (args, on_complete) = command.into_parts();
    let result = store.execute(persist, |tables| op(tables, args));

    if let Err(err) = &result {
        warn!("{} command failed: {}", queue, err);
    }

    on_complete(result);
}

impl Scheduler {
    pub(crate) fn start(store: &Arc<SharedStore>, poll_interval: Duration) -> Result<Scheduler> {
        //! Create the four queues and spawn their workers.

        let mut scheduler = Scheduler {
            init: Arc::new(CommandQueue::new()),
            modify: Arc::new(CommandQueue::new()),
            get: Arc::new(CommandQueue::new()),
            get_all: Arc::new(CommandQueue::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
            workers: Vec::with_capacity(4),
        };

        let shared = Arc::clone(store);
        let init = spawn_worker(
            "tabula-init",
            Arc::clone(&scheduler.init),
            Arc::clone(&scheduler.shutdown),
            poll_interval,
            move |command| run(&shared, "init table", Persist::IfDirty, command, engine::init_table),
        );
        scheduler.track(init)?;

        let shared = Arc::clone(store);
        let modify = spawn_worker(
            "tabula-modify",
            Arc::clone(&scheduler.modify),
            Arc::clone(&scheduler.shutdown),
            poll_interval,
            move |command| run(&shared, "modify", Persist::Always, command, engine::modify),
        );
        scheduler.track(modify)?;

        let shared = Arc::clone(store);
        let get = spawn_worker(
            "tabula-get",
            Arc::clone(&scheduler.get),
            Arc::clone(&scheduler.shutdown),
            poll_interval,
            move |command| {
                run(&shared, "get", Persist::IfDirty, command, |tables, query: LookupQuery| {
                    engine::get(tables, &query)
                })
            },
        );
        scheduler.track(get)?;

        let shared = Arc::clone(store);
        let get_all = spawn_worker(
            "tabula-get-all",
            Arc::clone(&scheduler.get_all),
            Arc::clone(&scheduler.shutdown),
            poll_interval,
            move |command| {
                run(&shared, "get all", Persist::IfDirty, command, |tables, query: LookupQuery| {
                    engine::get_all(tables, &query)
                })
            },
        );
        scheduler.track(get_all)?;

        Ok(scheduler)
    }

    fn track(&mut self, spawned: Result<JoinHandle<()>>) -> Result<()> {
        //! Keep a spawned worker, or stop the ones already running when the
        //! spawn failed.

        match spawned {
            Ok(handle) => {
                self.workers.push(handle);
                Ok(())
            }
            Err(err) => {
                self.shutdown();
                Err(err)
            }
        }
    }

    pub(crate) fn submit_init_table(&self, args: InitTableArgs, on_complete: Callback<()>) {
        self.init.enqueue(Command::new(args, on_complete));
    }

    pub(crate) fn submit_modify(&self, query: ModificationQuery, on_complete: Callback<ModifyOutcome>) {
        self.modify.enqueue(Command::new(query, on_complete));
    }

    pub(crate) fn submit_get(&self, query: LookupQuery, on_complete: Callback<Row>) {
        self.get.enqueue(Command::new(query, on_complete));
    }

    pub(crate) fn submit_get_all(&self, query: LookupQuery, on_complete: Callback<Vec<Row>>) {
        self.get_all.enqueue(Command::new(query, on_complete));
    }

    pub(crate) fn depths(&self) -> QueueDepths {
        QueueDepths {
            init_table: self.init.len(),
            modify: self.modify.len(),
            get: self.get.len(),
            get_all: self.get_all.len(),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        //! Ask every worker to stop once its queue is empty and wait for
        //! them. Calling it again does nothing.

        self.shutdown.store(true, Ordering::Release);

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("a queue worker panicked during shutdown");
            }
        }
    }
}
