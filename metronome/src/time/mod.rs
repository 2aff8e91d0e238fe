//! Time sources for the event loop.
//!
//! This module provides the clocks an [`EventLoop`](crate::EventLoop)
//! reads deadlines from:
//! - [`SystemClock`] for real, wall-paced execution,
//! - [`VirtualClock`] for deterministic, test-driven execution,
//! - [`Instant`], the clock-relative point in time both produce.

mod clock;
mod instant;

pub(crate) use clock::ClockKind;

#[doc(inline)]
pub use clock::{Clock, SystemClock, VirtualClock};

#[doc(inline)]
pub use instant::Instant;
