use super::core::{ErrorHook, EventLoop};
use crate::error::CallbackError;
use crate::time::{ClockKind, Instant, SystemClock, VirtualClock};

/// Which clock the built loop reads.
enum ClockChoice {
    System,
    Virtual { start: Instant },
}

/// Builder for configuring and creating an event loop.
///
/// `EventLoopBuilder` selects the loop's clock and error hook before the
/// loop is constructed. By default the loop runs on the system clock and
/// logs callback failures.
///
/// # Examples
///
/// ```rust,ignore
/// let lp = EventLoopBuilder::new()
///     .virtual_clock()
///     .error_hook(|err| eprintln!("callback failed: {err}"))
///     .build();
/// ```
pub struct EventLoopBuilder {
    /// Clock the loop will read.
    clock: ClockChoice,

    /// Hook receiving callback failures.
    error_hook: Option<ErrorHook>,
}

impl EventLoopBuilder {
    /// Creates a builder with the default configuration: system clock,
    /// failures logged.
    pub fn new() -> Self {
        Self {
            clock: ClockChoice::System,
            error_hook: None,
        }
    }

    /// Drives the loop with the operating system's monotonic clock.
    pub fn real_clock(mut self) -> Self {
        self.clock = ClockChoice::System;
        self
    }

    /// Drives the loop with a [`VirtualClock`] starting at
    /// [`Instant::ZERO`].
    pub fn virtual_clock(self) -> Self {
        self.start_at(Instant::ZERO)
    }

    /// Drives the loop with a [`VirtualClock`] starting at `start`.
    pub fn start_at(mut self, start: Instant) -> Self {
        self.clock = ClockChoice::Virtual { start };
        self
    }

    /// Installs the hook receiving failures of callbacks run by the loop.
    pub fn error_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(CallbackError) + 'static,
    {
        self.error_hook = Some(Box::new(hook));
        self
    }

    /// Builds the event loop with the configured options.
    pub fn build(self) -> EventLoop {
        let clock = match self.clock {
            ClockChoice::System => ClockKind::System(SystemClock::new()),
            ClockChoice::Virtual { start } => ClockKind::Virtual(VirtualClock::starting_at(start)),
        };

        EventLoop::from_parts(clock, self.error_hook)
    }
}

impl Default for EventLoopBuilder {
    /// Creates a default `EventLoopBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
