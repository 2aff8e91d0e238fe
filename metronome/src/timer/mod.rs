//! Timer bookkeeping.
//!
//! This module holds the deadline-ordered set of one-shot and repeating
//! timers of an event loop. Timers never run from here: once their
//! deadline has passed they are handed to the loop, which queues them as
//! ordinary tasks.
//!
//! Most users only see [`TimerHandle`], returned by
//! [`EventLoop::schedule_timeout`](crate::EventLoop::schedule_timeout)
//! and [`EventLoop::schedule_interval`](crate::EventLoop::schedule_interval).

mod entry;
mod handle;
mod set;

pub(crate) use entry::{FiredCallback, FiredTimer, TimerCallback};
pub(crate) use set::TimerSet;

pub use handle::TimerHandle;
