//! # Metronome
//!
//! **Metronome** is a deterministic, single-threaded event loop for Rust,
//! designed as the ordering engine of the **Nebula** ecosystem.
//!
//! It does not perform I/O and never spawns threads. Instead it decides,
//! deterministically, in which order queued work runs: subsystems that
//! complete I/O, deliver messages or react to user input feed their
//! results in as tasks and microtasks, and the loop runs them one at a
//! time, to completion.
//!
//! Metronome offers:
//!
//! - A **task queue** and a **microtask queue** with strict ordering: the
//!   microtask queue is drained to exhaustion after every task
//! - **Timers**, one-shot and repeating, that join the task queue when due
//!   and can be cancelled right up until they start running
//! - A **virtual clock** for fully reproducible, test-driven timing
//! - **Debounce** and **throttle** combinators built on the loop's timers
//! - **Remote handles** for feeding a loop from other threads
//! - Macros like `#[metronome::main]` and `#[metronome::test]`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use metronome::EventLoop;
//! use std::time::Duration;
//!
//! #[metronome::main]
//! fn main(lp: &EventLoop) {
//!     lp.schedule_timeout(|| println!("world"), Duration::from_millis(100));
//!     lp.enqueue_microtask(|| println!("hello"));
//! }
//! ```
//!
//! ## Ordering
//!
//! Given the same clock readings and the same enqueue calls, execution is
//! always: current synchronous work, all microtasks, the next task, all
//! microtasks, and so on. Timers with the same deadline fire in the order
//! they were scheduled.
//!
//! ## Modules
//!
//! - [`time`]: Clocks and instants
//! - [`timer`]: Timer handles
//! - [`tools`]: Debounce and throttle
//! - [`error`]: Error types

mod runtime;

pub mod error;
pub mod time;
pub mod timer;
pub mod tools;

pub use error::{CallbackError, ConfigurationError, Error, Result};
pub use runtime::{
    CallbackResult, EventLoop, EventLoopBuilder, IntoCallbackResult, RemoteHandle, WeakEventLoop,
};
pub use timer::TimerHandle;
pub use tools::{debounce, throttle};

pub use metronome_macros::*;
