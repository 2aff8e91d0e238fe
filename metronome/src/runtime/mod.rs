//! Core event loop components.
//!
//! This module contains the building blocks of the loop itself:
//! - the task and microtask queues,
//! - the tick algorithm and its run/step/drain drivers,
//! - callback invocation with failure capture,
//! - the builder and the remote injection channel.
//!
//! Most users only interact with [`EventLoop`], [`EventLoopBuilder`] and
//! [`RemoteHandle`], re-exported at the crate root.

mod core;
mod queue;
mod remote;

pub(crate) mod builder;
pub(crate) mod callback;

pub use self::core::{EventLoop, WeakEventLoop};
pub use builder::EventLoopBuilder;
pub use callback::{CallbackResult, IntoCallbackResult};
pub use remote::RemoteHandle;
