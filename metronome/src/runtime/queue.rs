use super::callback::Callback;
use crate::timer::FiredTimer;

use std::cell::RefCell;
use std::collections::VecDeque;

/// One entry of the task queue.
pub(crate) enum Task {
    /// A callback enqueued directly, locally or through a remote handle.
    Callback(Callback),

    /// A timer whose deadline has passed.
    Timer(FiredTimer),
}

/// The loop's queue of discrete units of work.
///
/// Tasks are pushed to the back and popped from the front (FIFO). The
/// queue is only ever touched from the loop's thread; the borrow is held
/// for the duration of a single push or pop, never across a callback.
pub(crate) struct TaskQueue {
    inner: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: RefCell::new(VecDeque::new()),
        }
    }

    pub(crate) fn push(&self, task: Task) {
        self.inner.borrow_mut().push_back(task);
    }

    /// Pops the oldest task, or `None` if the queue is empty.
    pub(crate) fn pop(&self) -> Option<Task> {
        self.inner.borrow_mut().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

/// The loop's queue of continuations.
///
/// Microtasks run after the current piece of work and before anything
/// else: the queue is drained to exhaustion between tasks.
pub(crate) struct MicrotaskQueue {
    inner: RefCell<VecDeque<Callback>>,
}

impl MicrotaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: RefCell::new(VecDeque::new()),
        }
    }

    pub(crate) fn push(&self, callback: Callback) {
        self.inner.borrow_mut().push_back(callback);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Pops and runs microtasks until the queue is empty.
    ///
    /// The queue is re-checked after every invocation, so microtasks
    /// enqueued by `run` are drained by the same call. Returns the number
    /// of microtasks run.
    pub(crate) fn drain(&self, mut run: impl FnMut(Callback)) -> usize {
        let mut count = 0;

        loop {
            let next = self.inner.borrow_mut().pop_front();
            let Some(callback) = next else {
                return count;
            };

            run(callback);
            count += 1;
        }
    }
}
