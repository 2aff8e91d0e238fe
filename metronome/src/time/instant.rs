use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

/// A point in time as seen by an event loop clock.
///
/// An `Instant` is the amount of time elapsed since the clock's origin.
/// For a [`VirtualClock`](super::VirtualClock) the origin is the moment
/// the clock was created (usually `Instant::ZERO`); for a
/// [`SystemClock`](super::SystemClock) it is the moment the clock was
/// constructed from the operating system's monotonic clock.
///
/// Instants of different clocks are not comparable in any meaningful way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(Duration);

impl Instant {
    /// The clock origin.
    pub const ZERO: Instant = Instant(Duration::ZERO);

    /// Creates an instant `elapsed` after the clock origin.
    pub const fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Creates an instant `millis` milliseconds after the clock origin.
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Time elapsed since the clock origin.
    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Whole milliseconds elapsed since the clock origin.
    pub const fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }

    /// Returns the duration from `earlier` to `self`, or zero if `earlier`
    /// is later than `self`.
    pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    /// Saturates instead of overflowing, so far-future deadlines stay valid.
    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0.saturating_add(rhs))
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
