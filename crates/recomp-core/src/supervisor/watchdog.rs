//! One-shot execution context with a bounded wait.
//!
//! Each [`Attempt`] owns a dedicated thread and the receiving end of a
//! single-slot channel. Waiting consumes the attempt, so a timed-out thread can
//! only be abandoned, never waited on or reused.

use std::{
    any::Any,
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};

#[derive(Debug)]
pub(crate) enum AttemptOutcome<T> {
    Completed(T),
    /// The job is still running. Its thread has been detached.
    TimedOut,
    /// The job's thread died without producing a value.
    Crashed(String),
}

pub(crate) struct Attempt<T> {
    rx: Receiver<T>,
    join: JoinHandle<()>,
}

impl<T: Send + 'static> Attempt<T> {
    pub(crate) fn spawn<F>(name: String, job: F) -> io::Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = bounded::<T>(1);
        let join = thread::Builder::new().name(name).spawn(move || {
            let _ = tx.send(job());
        })?;
        Ok(Self { rx, join })
    }

    pub(crate) fn wait(self, timeout: Duration) -> AttemptOutcome<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => {
                let _ = self.join.join();
                AttemptOutcome::Completed(value)
            }
            Err(RecvTimeoutError::Timeout) => {
                // Dropping the handle detaches the thread.
                drop(self.join);
                AttemptOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                let message = match self.join.join() {
                    Err(payload) => panic_message(payload.as_ref()),
                    Ok(()) => "thread exited without a result".to_string(),
                };
                AttemptOutcome::Crashed(message)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
