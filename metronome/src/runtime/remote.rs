use super::callback::{CallbackResult, IntoCallbackResult};
use crate::error::{Error, Result};

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

/// A callback sent to a loop from elsewhere.
pub(crate) type RemoteTask = Box<dyn FnOnce() -> CallbackResult + Send>;

/// A thread-safe handle for feeding work into an event loop.
///
/// An [`EventLoop`](crate::EventLoop) is bound to the thread that created
/// it. `RemoteHandle` is the only way for other threads, or for other
/// loops, to reach it: callbacks sent through the handle are appended to
/// the target loop's task queue at the start of its next tick. No state is
/// ever shared between loops.
///
/// Cloning the handle is cheap; every clone feeds the same loop.
#[derive(Clone)]
pub struct RemoteHandle {
    sender: Sender<RemoteTask>,
}

impl RemoteHandle {
    pub(crate) fn new(sender: Sender<RemoteTask>) -> Self {
        Self { sender }
    }

    /// Enqueues `callback` as a task on the target loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disconnected`] if the loop has been dropped.
    pub fn enqueue_task<F, R>(&self, callback: F) -> Result<()>
    where
        F: FnOnce() -> R + Send + 'static,
        R: IntoCallbackResult,
    {
        self.sender
            .send(Box::new(move || callback().into_callback_result()))
            .map_err(|_| Error::Disconnected)
    }
}

/// Receiving end of a loop's remote channel.
pub(crate) struct Inbox {
    receiver: Receiver<RemoteTask>,

    /// Kept so new remote handles can be minted on demand; this also keeps
    /// the channel open for as long as the loop lives.
    sender: Sender<RemoteTask>,
}

impl Inbox {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        Self { receiver, sender }
    }

    pub(crate) fn handle(&self) -> RemoteHandle {
        RemoteHandle::new(self.sender.clone())
    }

    /// Takes every message currently waiting, without blocking.
    pub(crate) fn try_drain(&self) -> Vec<RemoteTask> {
        let mut tasks = Vec::new();

        loop {
            match self.receiver.try_recv() {
                Ok(task) => tasks.push(task),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return tasks,
            }
        }
    }

    /// Blocks for at most `timeout` waiting for one message.
    pub(crate) fn wait(&self, timeout: std::time::Duration) -> Option<RemoteTask> {
        self.receiver.recv_timeout(timeout).ok()
    }
}
