use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{error, info};
use parking_lot::Mutex;

use crate::error::Result;

/// A FIFO of commands with a single consumer.
///
/// The lock is only held to push or pop; commands run outside of it.
pub(crate) struct CommandQueue<C> {
    pending: Mutex<VecDeque<C>>,
}

impl<C> CommandQueue<C> {
    pub(crate) fn new() -> CommandQueue<C> {
        CommandQueue {
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn enqueue(&self, command: C) {
        self.pending.lock().push_back(command);
    }

    pub(crate) fn dequeue(&self) -> Option<C> {
        self.pending.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

pub(crate) fn spawn_worker<C, H>(
    name: &str,
    queue: Arc<CommandQueue<C>>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
    handler: H,
) -> Result<JoinHandle<()>>
where
    C: Send + 'static,
    H: Fn(C) + Send + 'static,
{
    //! Start the thread draining `queue`.
    //!
    //! The worker takes one command at a time and hands it to `handler`. An
    //! empty queue is polled again after `poll_interval`. Once `shutdown` is
    //! set the worker keeps going until the queue is empty, so every command
    //! that was accepted still runs.

    let thread_name = name.to_string();
    let handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            info!("worker {} started", thread_name);

            loop {
                if let Some(command) = queue.dequeue() {
                    let ran = panic::catch_unwind(AssertUnwindSafe(|| handler(command)));
                    if ran.is_err() {
                        error!("worker {}: command panicked, moving on", thread_name);
                    }
                    continue;
                }

                if shutdown.load(Ordering::Acquire) && queue.is_empty() {
                    break;
                }

                thread::sleep(poll_interval);
            }

            info!("worker {} stopped", thread_name);
        })?;

    Ok(handle)
}
