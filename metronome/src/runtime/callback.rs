use crate::error::CallbackError;

use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of a single callback invocation.
pub type CallbackResult = Result<(), CallbackError>;

/// A one-shot unit of work: tasks, microtasks and timeouts.
pub(crate) type Callback = Box<dyn FnOnce() -> CallbackResult>;

/// A unit of work that may run many times: intervals.
pub(crate) type RepeatCallback = Box<dyn FnMut() -> CallbackResult>;

/// Return types accepted from callbacks.
///
/// A callback may return nothing, or a `Result<(), E>` for any error type
/// convertible into a boxed error. An `Err` is reported to the loop's error
/// hook exactly like a panic would be.
pub trait IntoCallbackResult: 'static {
    /// Converts the callback's return value into a [`CallbackResult`].
    fn into_callback_result(self) -> CallbackResult;
}

impl IntoCallbackResult for () {
    fn into_callback_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E> IntoCallbackResult for Result<(), E>
where
    E: Into<Box<dyn StdError + 'static>> + 'static,
{
    fn into_callback_result(self) -> CallbackResult {
        self.map_err(CallbackError::failed)
    }
}

/// Boxes a user closure as a one-shot [`Callback`].
pub(crate) fn boxed<F, R>(callback: F) -> Callback
where
    F: FnOnce() -> R + 'static,
    R: IntoCallbackResult,
{
    Box::new(move || callback().into_callback_result())
}

/// Boxes a user closure as a [`RepeatCallback`].
pub(crate) fn boxed_repeat<F, R>(mut callback: F) -> RepeatCallback
where
    F: FnMut() -> R + 'static,
    R: IntoCallbackResult,
{
    Box::new(move || callback().into_callback_result())
}

/// Runs `f` to completion, turning a panic into a [`CallbackError`].
///
/// No loop state may be borrowed while `f` runs.
pub(crate) fn guarded<F>(f: F) -> CallbackResult
where
    F: FnOnce() -> CallbackResult,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(CallbackError::from_panic(payload)),
    }
}
