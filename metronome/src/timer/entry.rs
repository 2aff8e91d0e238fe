use super::TimerHandle;
use crate::runtime::callback::{Callback, RepeatCallback};
use crate::time::Instant;

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;
use std::time::Duration;

/// Work attached to a timer.
pub(crate) enum TimerCallback {
    /// Fires once, then the timer is gone.
    Once(Callback),

    /// Fires every `interval` until cancelled.
    ///
    /// The callback is shared with any fired-but-not-yet-run copies of the
    /// timer sitting in the task queue.
    Repeat {
        interval: Duration,
        callback: Rc<RefCell<RepeatCallback>>,
    },
}

/// An entry in the timer heap.
///
/// `TimerEntry` represents a scheduled callback at a specific deadline.
/// It is stored inside a binary heap ordered by deadline, with ties broken
/// by the order in which entries were inserted.
///
/// The entry may be cancelled before it fires. Cancelled entries stay in
/// the heap and are discarded when they reach the top.
pub(crate) struct TimerEntry {
    /// The handle the timer was scheduled under.
    pub(crate) handle: TimerHandle,

    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Insertion order, used to break deadline ties.
    pub(crate) seq: u64,

    /// What to run when the deadline is reached.
    pub(crate) callback: TimerCallback,

    /// Cancellation flag shared with the timer set and fired copies.
    pub(crate) cancelled: Rc<Cell<bool>>,
}

impl TimerEntry {
    /// The repeat period, if this is an interval timer.
    pub(crate) fn interval(&self) -> Option<Duration> {
        match &self.callback {
            TimerCallback::Once(_) => None,
            TimerCallback::Repeat { interval, .. } => Some(*interval),
        }
    }
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// Orders timer entries by deadline, then by insertion order.
    ///
    /// The comparison is **reversed** so that a `BinaryHeap<TimerEntry>`
    /// behaves as a min-heap: the earliest deadline, and among equal
    /// deadlines the earliest scheduled entry, is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A timer whose deadline has passed, on its way to the task queue.
pub(crate) struct FiredTimer {
    pub(crate) handle: TimerHandle,

    /// Checked again right before the callback runs, so a cancellation
    /// issued after the pop still wins.
    pub(crate) cancelled: Rc<Cell<bool>>,

    pub(crate) callback: FiredCallback,
}

pub(crate) enum FiredCallback {
    Once(Callback),
    Repeat(Rc<RefCell<RepeatCallback>>),
}
