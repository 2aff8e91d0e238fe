//! Error types.
//!
//! Three families of failure exist:
//! - [`CallbackError`]: user code failed while the loop was running it,
//! - [`ConfigurationError`]: a timer or combinator was set up with values
//!   that can never behave sensibly, rejected before anything is scheduled,
//! - the remaining [`Error`] variants: misuse of the loop itself.

use crate::timer::TimerHandle;

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by event loop operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A callback failed while being invoked synchronously for the caller.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// The handle was issued by a different event loop.
    #[error("timer handle {0} was not issued by this event loop")]
    InvalidHandle(TimerHandle),

    /// Invalid timer or combinator configuration.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The loop runs on the system clock, which cannot be moved by hand.
    #[error("the event loop uses the system clock and cannot be advanced manually")]
    RealClock,

    /// The event loop behind a remote handle no longer exists.
    #[error("the event loop has been dropped")]
    Disconnected,
}

/// Rejected timer or combinator settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A repeating timer needs a non-zero period.
    #[error("repeat interval must be greater than zero (got {0:?})")]
    ZeroInterval(Duration),

    /// A combinator configured to never call its operation.
    #[error("{0} must enable at least one of the leading or trailing edges")]
    NoEdge(&'static str),
}

/// A failure raised by user-supplied code.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback failed: {0}")]
    Failed(Box<dyn StdError + 'static>),

    /// The callback panicked. Holds the panic message when it is a string.
    #[error("callback panicked: {0}")]
    Panicked(String),

    /// A wrapped operation was invoked again from inside its own body.
    #[error("operation re-entered while already running")]
    Reentrant,
}

impl CallbackError {
    /// Wraps any error value as a callback failure.
    ///
    /// A `CallbackError` passed in is returned as is rather than nested.
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + 'static>>,
    {
        match error.into().downcast::<CallbackError>() {
            Ok(error) => *error,
            Err(error) => CallbackError::Failed(error),
        }
    }

    /// Builds a `Panicked` error from a panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        CallbackError::Panicked(message)
    }
}
