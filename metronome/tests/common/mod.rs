#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Collects events in the order callbacks produced them.
pub struct Recorder<T> {
    events: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&self, event: T) {
        self.events.borrow_mut().push(event);
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Runs a virtual-clock loop until its clock reads `millis`.
pub fn run_to(lp: &metronome::EventLoop, millis: u64) {
    let target = metronome::time::Instant::from_millis(millis);

    lp.run_for(target - lp.now())
        .expect("loop should use a virtual clock");
}

/// Routes the loop's logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
