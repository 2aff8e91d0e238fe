use super::Operation;
use crate::error::{CallbackError, ConfigurationError, Result};
use crate::runtime::{EventLoop, IntoCallbackResult, WeakEventLoop};
use crate::timer::TimerHandle;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

/// Which edges of a window a [`Throttle`] fires on.
///
/// The default enables both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleOptions {
    /// Call the operation immediately when a window opens.
    pub leading: bool,

    /// Call the operation with the latest arguments when a window closes,
    /// if calls arrived during it.
    pub trailing: bool,
}

impl ThrottleOptions {
    /// Sets whether a call outside a window runs the operation at once.
    pub fn leading(mut self, enabled: bool) -> Self {
        self.leading = enabled;
        self
    }

    /// Sets whether the last call inside a window runs when it closes.
    pub fn trailing(mut self, enabled: bool) -> Self {
        self.trailing = enabled;
        self
    }
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

/// Wraps `operation` so that it runs at most once per `delay` window.
///
/// The first call opens a window and runs the operation immediately.
/// Calls made while the window is open are coalesced: only the last one's
/// arguments are kept, and they are used for a single trailing call when
/// the window closes, which also opens the next window.
///
/// The window starts when the leading call is made, not when it returns.
///
/// # Errors
///
/// Returns [`ConfigurationError::NoEdge`] if both edges are disabled.
pub fn throttle<A, F, R>(
    event_loop: &EventLoop,
    operation: F,
    delay: Duration,
    options: ThrottleOptions,
) -> Result<Throttle<A>>
where
    A: 'static,
    F: FnMut(A) -> R + 'static,
    R: IntoCallbackResult,
{
    if !options.leading && !options.trailing {
        return Err(ConfigurationError::NoEdge("throttle").into());
    }

    Ok(Throttle {
        event_loop: event_loop.clone(),
        shared: Rc::new(Shared {
            event_loop: event_loop.downgrade(),
            delay,
            options,
            state: RefCell::new(State {
                mode: Mode::Idle,
                trailing_args: None,
            }),
            operation: Operation::new(operation),
        }),
    })
}

/// A throttled operation. See [`throttle`].
///
/// Dropping the wrapper cancels the cooldown and any queued trailing call.
pub struct Throttle<A> {
    event_loop: EventLoop,
    shared: Rc<Shared<A>>,
}

struct Shared<A> {
    /// Weak so the cooldown timer does not keep the loop alive.
    event_loop: WeakEventLoop,
    delay: Duration,
    options: ThrottleOptions,
    state: RefCell<State<A>>,
    operation: Operation<A>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Idle,
    Cooldown(TimerHandle),
}

struct State<A> {
    mode: Mode,
    trailing_args: Option<A>,
}

impl<A: 'static> Shared<A> {
    /// Opens a window of `delay`.
    fn arm(self: &Rc<Self>, event_loop: &EventLoop) -> TimerHandle {
        let shared = Rc::downgrade(self);

        event_loop.schedule_timeout(move || fire(&shared), self.delay)
    }
}

impl<A: 'static> Throttle<A> {
    /// Records a call.
    ///
    /// Outside a window, runs the operation now (leading edge) and opens a
    /// window. Inside a window, replaces the queued trailing arguments.
    ///
    /// # Errors
    ///
    /// Returns the operation's failure when it runs on the leading edge.
    pub fn invoke(&self, args: A) -> Result<(), CallbackError> {
        let mut state = self.shared.state.borrow_mut();

        match state.mode {
            Mode::Cooldown(_) => {
                if self.shared.options.trailing {
                    state.trailing_args = Some(args);
                }

                Ok(())
            }

            Mode::Idle => {
                state.mode = Mode::Cooldown(self.shared.arm(&self.event_loop));

                if !self.shared.options.leading {
                    state.trailing_args = Some(args);
                    return Ok(());
                }

                drop(state);

                trace!("throttle leading call");
                self.shared.operation.call(args)
            }
        }
    }

    /// Runs a queued trailing call now and closes the window.
    ///
    /// Without a queued call the window stays open, so the next call still
    /// counts as inside it.
    ///
    /// # Errors
    ///
    /// Returns the operation's failure.
    pub fn flush(&self) -> Result<(), CallbackError> {
        let args = {
            let mut state = self.shared.state.borrow_mut();

            let Mode::Cooldown(handle) = state.mode else {
                return Ok(());
            };

            let Some(args) = state.trailing_args.take() else {
                return Ok(());
            };

            self.event_loop.cancel_timer(handle);
            state.mode = Mode::Idle;
            args
        };

        trace!("throttle flushed");
        self.shared.operation.call(args)
    }

    /// Closes the window and drops any queued trailing call.
    pub fn cancel(&self) {
        let mut state = self.shared.state.borrow_mut();

        if let Mode::Cooldown(handle) = state.mode {
            self.event_loop.cancel_timer(handle);
        }

        state.mode = Mode::Idle;
        state.trailing_args = None;
    }

    /// Returns `true` while a window is open.
    pub fn is_cooling_down(&self) -> bool {
        matches!(self.shared.state.borrow().mode, Mode::Cooldown(_))
    }
}

/// Window closed: run the queued call and reopen, or go idle.
fn fire<A: 'static>(shared: &Weak<Shared<A>>) -> Result<(), CallbackError> {
    let Some(shared) = shared.upgrade() else {
        return Ok(());
    };

    let Some(event_loop) = shared.event_loop.upgrade() else {
        return Ok(());
    };

    let args = {
        let mut state = shared.state.borrow_mut();

        match state.trailing_args.take() {
            Some(args) => {
                state.mode = Mode::Cooldown(shared.arm(&event_loop));
                Some(args)
            }
            None => {
                state.mode = Mode::Idle;
                None
            }
        }
    };

    match args {
        Some(args) => {
            trace!("throttle trailing call");
            shared.operation.call(args)
        }
        None => Ok(()),
    }
}

impl<A> Drop for Throttle<A> {
    fn drop(&mut self) {
        let mut state = self.shared.state.borrow_mut();

        if let Mode::Cooldown(handle) = state.mode {
            self.event_loop.cancel_timer(handle);
        }

        state.mode = Mode::Idle;
    }
}
