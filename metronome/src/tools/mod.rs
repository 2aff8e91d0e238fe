//! Rate-control combinators.
//!
//! This module provides wrappers that control how often an operation runs,
//! built on the timers of an [`EventLoop`](crate::EventLoop):
//! - [`debounce`] runs the operation once a burst of calls has gone quiet,
//! - [`throttle`] runs it at most once per window, coalescing the calls in
//!   between into a single trailing call.
//!
//! Both wrappers are driven entirely by the loop they were created on and
//! cancel their pending timer when dropped.

mod debounce;
mod throttle;

#[doc(inline)]
pub use debounce::{Debounce, DebounceOptions, debounce};

#[doc(inline)]
pub use throttle::{Throttle, ThrottleOptions, throttle};

use crate::error::CallbackError;
use crate::runtime::{CallbackResult, IntoCallbackResult};

use std::cell::RefCell;

/// The user operation behind a combinator.
struct Operation<A> {
    inner: RefCell<Box<dyn FnMut(A) -> CallbackResult>>,
}

impl<A: 'static> Operation<A> {
    fn new<F, R>(mut operation: F) -> Self
    where
        F: FnMut(A) -> R + 'static,
        R: IntoCallbackResult,
    {
        Self {
            inner: RefCell::new(Box::new(move |args| operation(args).into_callback_result())),
        }
    }

    /// Calls the operation with `args`.
    ///
    /// Panics propagate to the caller. Calling the operation again from
    /// inside its own body yields [`CallbackError::Reentrant`].
    fn call(&self, args: A) -> CallbackResult {
        let Ok(mut operation) = self.inner.try_borrow_mut() else {
            return Err(CallbackError::Reentrant);
        };

        (&mut *operation)(args)
    }
}
