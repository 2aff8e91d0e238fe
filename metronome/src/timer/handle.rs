use std::fmt;
use std::num::NonZeroU64;

/// Identifies a timer scheduled on an event loop.
///
/// Handles are issued in strictly increasing order and are never reused
/// during the lifetime of the loop that issued them. A handle is the only
/// way to cancel its timer.
///
/// Each handle also remembers which loop issued it, so a handle passed to
/// the wrong loop is reported instead of silently cancelling an unrelated
/// timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle {
    /// Identifier of the issuing event loop.
    loop_id: u64,

    /// Sequence number within the issuing loop.
    id: NonZeroU64,
}

impl TimerHandle {
    pub(crate) fn new(loop_id: u64, id: NonZeroU64) -> Self {
        Self { loop_id, id }
    }

    /// Identifier of the loop that issued this handle.
    pub(crate) fn loop_id(&self) -> u64 {
        self.loop_id
    }

    /// The handle's sequence number, unique within its loop.
    pub fn id(&self) -> u64 {
        self.id.get()
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}
