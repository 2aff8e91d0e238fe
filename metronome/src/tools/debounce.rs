use super::Operation;
use crate::error::{CallbackError, ConfigurationError, Result};
use crate::runtime::{EventLoop, IntoCallbackResult};
use crate::timer::TimerHandle;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

/// Which edges of a burst a [`Debounce`] fires on.
///
/// The default is trailing only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Call the operation on the first call of a burst.
    pub leading: bool,

    /// Call the operation once the burst has been quiet for the delay.
    pub trailing: bool,
}

impl DebounceOptions {
    /// Sets whether the first call of a burst runs the operation.
    pub fn leading(mut self, enabled: bool) -> Self {
        self.leading = enabled;
        self
    }

    /// Sets whether the operation runs once the burst goes quiet.
    pub fn trailing(mut self, enabled: bool) -> Self {
        self.trailing = enabled;
        self
    }
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            leading: false,
            trailing: true,
        }
    }
}

/// Wraps `operation` so that a burst of calls runs it once.
///
/// Every [`invoke`](Debounce::invoke) restarts a `delay` timer on
/// `event_loop`. When the timer finally fires, the operation runs with the
/// arguments of the most recent call.
///
/// # Errors
///
/// Returns [`ConfigurationError::NoEdge`] if both edges are disabled.
///
/// # Examples
///
/// ```rust,ignore
/// let save = debounce(&lp, |doc: String| store(doc), Duration::from_millis(100), DebounceOptions::default())?;
///
/// save.invoke("draft 1".into())?;
/// save.invoke("draft 2".into())?; // only "draft 2" is stored
/// ```
pub fn debounce<A, F, R>(
    event_loop: &EventLoop,
    operation: F,
    delay: Duration,
    options: DebounceOptions,
) -> Result<Debounce<A>>
where
    A: 'static,
    F: FnMut(A) -> R + 'static,
    R: IntoCallbackResult,
{
    if !options.leading && !options.trailing {
        return Err(ConfigurationError::NoEdge("debounce").into());
    }

    Ok(Debounce {
        event_loop: event_loop.clone(),
        shared: Rc::new(Shared {
            delay,
            options,
            state: RefCell::new(State {
                pending: None,
                last_args: None,
            }),
            operation: Operation::new(operation),
        }),
    })
}

/// A debounced operation. See [`debounce`].
///
/// Dropping the wrapper cancels any pending call.
pub struct Debounce<A> {
    event_loop: EventLoop,
    shared: Rc<Shared<A>>,
}

struct Shared<A> {
    delay: Duration,
    options: DebounceOptions,
    state: RefCell<State<A>>,
    operation: Operation<A>,
}

/// `pending` is `Some` exactly while the wrapper is in the Pending state.
struct State<A> {
    pending: Option<TimerHandle>,
    last_args: Option<A>,
}

impl<A: 'static> Debounce<A> {
    /// Records a call.
    ///
    /// Restarts the quiet-period timer. With leading calls enabled, the
    /// first call of a burst also runs the operation right away; with both
    /// edges enabled its arguments are kept for the trailing call too.
    ///
    /// # Errors
    ///
    /// Returns the operation's failure when it runs on the leading edge.
    pub fn invoke(&self, args: A) -> Result<(), CallbackError>
    where
        A: Clone,
    {
        let mut state = self.shared.state.borrow_mut();

        let was_idle = match state.pending.take() {
            Some(handle) => {
                self.event_loop.cancel_timer(handle);
                false
            }
            None => true,
        };

        state.pending = Some(self.arm());

        if was_idle && self.shared.options.leading {
            state.last_args = self.shared.options.trailing.then(|| args.clone());
            drop(state);

            trace!("debounce leading call");
            return self.shared.operation.call(args);
        }

        if self.shared.options.trailing {
            state.last_args = Some(args);
        }

        Ok(())
    }

    /// Runs a pending trailing call now instead of waiting for the timer.
    ///
    /// Does nothing if no call is pending.
    ///
    /// # Errors
    ///
    /// Returns the operation's failure.
    pub fn flush(&self) -> Result<(), CallbackError> {
        let args = {
            let mut state = self.shared.state.borrow_mut();

            let Some(handle) = state.pending.take() else {
                return Ok(());
            };

            self.event_loop.cancel_timer(handle);
            state.last_args.take()
        };

        match args {
            Some(args) => self.shared.operation.call(args),
            None => Ok(()),
        }
    }

    /// Drops a pending call without running it.
    pub fn cancel(&self) {
        let mut state = self.shared.state.borrow_mut();

        if let Some(handle) = state.pending.take() {
            self.event_loop.cancel_timer(handle);
        }

        state.last_args = None;
    }

    /// Returns `true` while a burst is in progress.
    pub fn is_pending(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }

    fn arm(&self) -> TimerHandle {
        let shared = Rc::downgrade(&self.shared);

        self.event_loop
            .schedule_timeout(move || fire(&shared), self.shared.delay)
    }
}

/// Quiet period elapsed: run the trailing call, if any, and go idle.
fn fire<A: 'static>(shared: &Weak<Shared<A>>) -> Result<(), CallbackError> {
    let Some(shared) = shared.upgrade() else {
        return Ok(());
    };

    let args = {
        let mut state = shared.state.borrow_mut();
        state.pending = None;
        state.last_args.take()
    };

    match args {
        Some(args) if shared.options.trailing => {
            trace!("debounce trailing call");
            shared.operation.call(args)
        }
        _ => Ok(()),
    }
}

impl<A> Drop for Debounce<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.shared.state.borrow_mut().pending.take() {
            self.event_loop.cancel_timer(handle);
        }
    }
}
