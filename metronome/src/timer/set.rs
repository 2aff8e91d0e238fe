use super::TimerHandle;
use super::entry::{FiredCallback, FiredTimer, TimerCallback, TimerEntry};
use crate::time::Instant;

use std::cell::Cell;
use std::collections::binary_heap::PeekMut;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroU64;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

/// Heap size below which cancelled entries are never compacted away.
const COMPACT_THRESHOLD: usize = 64;

/// The set of timers owned by one event loop.
///
/// Timers live in a min-heap keyed by `(deadline, insertion order)`.
/// Cancellation flips a shared flag and forgets the handle; the heap entry
/// itself is dropped lazily when it surfaces, or in bulk once cancelled
/// entries make up most of the heap.
pub(crate) struct TimerSet {
    /// Identifier of the owning loop, stamped into every handle.
    loop_id: u64,

    /// Min-heap of scheduled entries, including cancelled leftovers.
    heap: BinaryHeap<TimerEntry>,

    /// Cancellation flags of every timer that may still run.
    ///
    /// A one-shot timer stays here after it is popped, until its task
    /// starts running, so that cancelling it in between still works.
    live: HashMap<TimerHandle, Rc<Cell<bool>>>,

    /// Last handle number issued.
    last_handle: u64,

    /// Last insertion sequence number issued.
    last_seq: u64,
}

impl TimerSet {
    pub(crate) fn new(loop_id: u64) -> Self {
        Self {
            loop_id,
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            last_handle: 0,
            last_seq: 0,
        }
    }

    /// Schedules `callback` to become ready `delay` after `now`.
    ///
    /// A zero delay makes the timer ready on the next check, never
    /// immediately.
    pub(crate) fn schedule(
        &mut self,
        now: Instant,
        delay: Duration,
        callback: TimerCallback,
    ) -> TimerHandle {
        self.last_handle += 1;
        let id = NonZeroU64::new(self.last_handle).unwrap_or(NonZeroU64::MAX);
        let handle = TimerHandle::new(self.loop_id, id);

        let cancelled = Rc::new(Cell::new(false));
        self.live.insert(handle, cancelled.clone());

        let entry = TimerEntry {
            handle,
            deadline: now + delay,
            seq: self.next_seq(),
            callback,
            cancelled,
        };

        trace!(
            %handle,
            deadline = %entry.deadline,
            interval = ?entry.interval(),
            "timer scheduled"
        );

        self.heap.push(entry);
        handle
    }

    /// Cancels the timer behind `handle`.
    ///
    /// Returns `true` if a live timer was cancelled. Unknown, fired and
    /// already-cancelled handles are ignored.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(flag) = self.live.remove(&handle) else {
            return false;
        };

        flag.set(true);
        trace!(%handle, "timer cancelled");

        self.compact();
        true
    }

    /// Removes and returns every live timer whose deadline is `<= now`.
    ///
    /// Entries come out by ascending deadline, ties in schedule order.
    /// Repeating timers are put back with `deadline = now + interval`, so
    /// each handle fires at most once per call no matter how far behind
    /// the loop is.
    pub(crate) fn pop_ready(&mut self, now: Instant) -> Vec<FiredTimer> {
        let mut ready = Vec::new();
        let mut rearm = Vec::new();

        while let Some(top) = self.heap.peek_mut() {
            if top.deadline > now {
                break;
            }

            let entry = PeekMut::pop(top);
            if entry.cancelled.get() {
                continue;
            }

            let TimerEntry {
                handle,
                callback,
                cancelled,
                ..
            } = entry;

            match callback {
                TimerCallback::Once(callback) => {
                    ready.push(FiredTimer {
                        handle,
                        cancelled,
                        callback: FiredCallback::Once(callback),
                    });
                }

                TimerCallback::Repeat { interval, callback } => {
                    ready.push(FiredTimer {
                        handle,
                        cancelled: cancelled.clone(),
                        callback: FiredCallback::Repeat(callback.clone()),
                    });

                    rearm.push((handle, now + interval, interval, callback, cancelled));
                }
            }
        }

        for (handle, deadline, interval, callback, cancelled) in rearm {
            let seq = self.next_seq();
            self.heap.push(TimerEntry {
                handle,
                deadline,
                seq,
                callback: TimerCallback::Repeat { interval, callback },
                cancelled,
            });
        }

        ready
    }

    /// Forgets a fired one-shot timer whose callback is about to run.
    pub(crate) fn retire(&mut self, handle: TimerHandle) {
        self.live.remove(&handle);
    }

    /// Earliest deadline among timers that are not cancelled.
    pub(crate) fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(top) = self.heap.peek_mut() {
            if !top.cancelled.get() {
                return Some(top.deadline);
            }

            PeekMut::pop(top);
        }

        None
    }

    /// Number of timers that may still run.
    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    fn next_seq(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }

    /// Drops cancelled heap entries once they dominate the heap.
    fn compact(&mut self) {
        let len = self.heap.len();
        if len < COMPACT_THRESHOLD || len <= 2 * self.live.len() {
            return;
        }

        self.heap.retain(|entry| !entry.cancelled.get());
        trace!(before = len, after = self.heap.len(), "timer heap compacted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::callback::RepeatCallback;

    use std::cell::RefCell;

    fn once() -> TimerCallback {
        TimerCallback::Once(Box::new(|| Ok(())))
    }

    #[test]
    fn cancelled_entries_are_compacted() {
        let mut set = TimerSet::new(1);
        let now = Instant::ZERO;

        let handles: Vec<_> = (0..COMPACT_THRESHOLD * 2)
            .map(|_| set.schedule(now, Duration::from_millis(10), once()))
            .collect();

        for handle in &handles[1..] {
            set.cancel(*handle);
        }

        assert_eq!(set.len(), 1);
        assert!(set.heap.len() < COMPACT_THRESHOLD);
    }

    #[test]
    fn ready_timers_keep_schedule_order() {
        let mut set = TimerSet::new(1);
        let now = Instant::ZERO;

        let late = set.schedule(now, Duration::from_millis(20), once());
        let first = set.schedule(now, Duration::from_millis(10), once());
        let second = set.schedule(now, Duration::from_millis(10), once());

        let fired: Vec<_> = set
            .pop_ready(Instant::from_millis(20))
            .into_iter()
            .map(|timer| timer.handle)
            .collect();

        assert_eq!(fired, vec![first, second, late]);
        assert!(set.pop_ready(Instant::from_millis(100)).is_empty());
    }

    #[test]
    fn intervals_are_rearmed_from_fire_time() {
        let mut set = TimerSet::new(1);
        let repeat: RepeatCallback = Box::new(|| Ok(()));

        set.schedule(
            Instant::ZERO,
            Duration::from_millis(10),
            TimerCallback::Repeat {
                interval: Duration::from_millis(10),
                callback: Rc::new(RefCell::new(repeat)),
            },
        );

        assert_eq!(set.pop_ready(Instant::from_millis(35)).len(), 1);
        assert_eq!(set.next_deadline(), Some(Instant::from_millis(45)));
        assert_eq!(set.len(), 1);
    }
}
