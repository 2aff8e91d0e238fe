use super::Instant;

use std::cell::Cell;
use std::time::Duration;

/// A monotonic time source.
///
/// Implementations must never go backwards: two successive calls to
/// [`now`](Self::now) return non-decreasing instants.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// A clock backed by the operating system's monotonic clock.
///
/// Its origin is the moment the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    /// Reference point all instants are measured from.
    origin: std::time::Instant,
}

impl SystemClock {
    /// Creates a system clock whose origin is "now".
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from_elapsed(self.origin.elapsed())
    }
}

/// A clock that only moves when told to.
///
/// `VirtualClock` makes time-based behavior deterministic: nothing
/// happens "by itself", and tests decide exactly when deadlines pass.
/// Advancing the clock has no side effects; firing timers is the event
/// loop's job.
///
/// # Examples
///
/// ```rust,ignore
/// let clock = VirtualClock::new();
/// clock.advance(Duration::from_millis(50));
/// assert_eq!(clock.now(), Instant::from_millis(50));
/// ```
#[derive(Debug, Default)]
pub struct VirtualClock {
    /// Current position of the clock.
    now: Cell<Instant>,
}

impl VirtualClock {
    /// Creates a virtual clock at [`Instant::ZERO`].
    pub fn new() -> Self {
        Self::starting_at(Instant::ZERO)
    }

    /// Creates a virtual clock positioned at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Moves the clock to `target`.
    ///
    /// Targets in the past are ignored so the clock stays monotonic.
    pub fn advance_to(&self, target: Instant) {
        if target > self.now.get() {
            self.now.set(target);
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// The clock owned by an event loop.
#[derive(Debug)]
pub(crate) enum ClockKind {
    System(SystemClock),
    Virtual(VirtualClock),
}

impl ClockKind {
    /// Returns the virtual clock, if this is one.
    pub(crate) fn as_virtual(&self) -> Option<&VirtualClock> {
        match self {
            ClockKind::Virtual(clock) => Some(clock),
            ClockKind::System(_) => None,
        }
    }
}

impl Clock for ClockKind {
    fn now(&self) -> Instant {
        match self {
            ClockKind::System(clock) => clock.now(),
            ClockKind::Virtual(clock) => clock.now(),
        }
    }
}
