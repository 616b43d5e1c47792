use std::{
    sync::mpsc::{self, RecvTimeoutError},
    time::Duration,
};

use crate::error::{Error, Result};

/// Completion of a queued command. Called exactly once, by the worker that
/// ran the command, after the store lock is released.
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Arguments of one queued operation paired with its completion.
pub(crate) struct Command<A, T> {
    args: A,
    on_complete: Callback<T>,
}

impl<A, T> Command<A, T> {
    pub(crate) fn new(args: A, on_complete: Callback<T>) -> Command<A, T> {
        Command { args, on_complete }
    }

    pub(crate) fn into_parts(self) -> (A, Callback<T>) {
        (self.args, self.on_complete)
    }
}

/// The eventual result of a queued command.
///
/// Submitting never blocks; a [`Pending`] is how the caller picks the result
/// up later. It is backed by a channel that the command's completion sends
/// into.
pub struct Pending<T> {
    receiver: mpsc::Receiver<Result<T>>,
}

impl<T: Send + 'static> Pending<T> {
    pub(crate) fn channel() -> (Callback<T>, Pending<T>) {
        let (sender, receiver) = mpsc::channel();
        let callback: Callback<T> = Box::new(move |result| {
            // the caller may have dropped its Pending; nothing to deliver to
            let _ = sender.send(result);
        });

        (callback, Pending { receiver })
    }
}

impl<T> Pending<T> {
    pub fn wait(self) -> Result<T> {
        //! Block until the command has run.

        self.receiver.recv().unwrap_or(Err(Error::WorkerGone))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        //! Block for at most `timeout`. Returns [`None`] if the command has
        //! not run yet.
        //!
        //! The result is handed out once; asking again after a [`Some`]
        //! yields [`Error::WorkerGone`].

        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(Error::WorkerGone)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_receives_completion() {
        let (callback, pending) = Pending::<usize>::channel();
        let command = Command::new("args", callback);

        let (args, on_complete) = command.into_parts();
        assert_eq!(args, "args");
        on_complete(Ok(7));

        assert_eq!(pending.wait().unwrap(), 7);
    }

    #[test]
    fn pending_reports_dropped_completion() {
        let (callback, pending) = Pending::<()>::channel();
        drop(callback);

        assert!(matches!(pending.wait(), Err(Error::WorkerGone)));
    }

    #[test]
    fn pending_times_out_before_completion() {
        let (callback, pending) = Pending::<()>::channel();

        assert!(pending.wait_timeout(Duration::from_millis(5)).is_none());
        callback(Ok(()));
        assert!(matches!(pending.wait_timeout(Duration::from_millis(5)), Some(Ok(()))));
    }
}
