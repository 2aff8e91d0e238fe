//! Example: Ordering of tasks, microtasks and timers


use metronome::EventLoop;
use std::time::Duration;

#[metronome::main]
fn main(lp: &EventLoop) {
    // Runs last: even a zero delay waits for the next timer check
    lp.schedule_timeout(|| println!("4. timer"), Duration::ZERO);

    // Runs once the current synchronous work is done
    lp.enqueue_microtask(|| println!("2. microtask"));

    // Runs on the first tick, after the microtasks
    lp.enqueue_task(|| println!("3. task"));

    println!("1. synchronous");
}
