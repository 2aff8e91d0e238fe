mod common;

use common::{Recorder, ms};
use metronome::EventLoop;

#[test]
fn test_task_runs_before_its_microtasks() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    lp.enqueue_task({
        let log = log.clone();
        move || log.push("T")
    });
    lp.enqueue_microtask({
        let log = log.clone();
        move || log.push("M")
    });

    assert!(lp.step(), "Step should report work");
    assert_eq!(log.snapshot(), vec!["T", "M"]);
}

#[test]
fn test_one_task_per_tick() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    for name in ["T1", "T2", "T3"] {
        let log = log.clone();
        lp.enqueue_task(move || log.push(name));
    }

    lp.step();
    assert_eq!(log.snapshot(), vec!["T1"], "Only one task should run per tick");

    lp.step();
    assert_eq!(log.snapshot(), vec!["T1", "T2"]);

    assert_eq!(lp.run_until_idle(), 1);
    assert_eq!(log.snapshot(), vec!["T1", "T2", "T3"]);
    assert!(!lp.step(), "An idle loop should report no work");
}

#[test]
fn test_microtasks_enqueued_during_drain_run_before_next_task() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    lp.enqueue_task({
        let lp = lp.clone();
        let log = log.clone();
        move || {
            log.push("T1");

            lp.enqueue_task({
                let log = log.clone();
                move || log.push("T2")
            });

            lp.enqueue_microtask({
                let lp = lp.clone();
                let log = log.clone();
                move || {
                    log.push("M1");
                    lp.enqueue_microtask({
                        let log = log.clone();
                        move || log.push("M2")
                    });
                }
            });
        }
    });

    lp.step();
    assert_eq!(
        log.snapshot(),
        vec!["T1", "M1", "M2"],
        "Nested microtasks should drain in the same tick"
    );

    lp.run_until_idle();
    assert_eq!(log.snapshot(), vec!["T1", "M1", "M2", "T2"]);
}

#[test]
fn test_zero_delay_timer_does_not_preempt_synchronous_code() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    lp.block_on(|lp| {
        lp.schedule_timeout(
            {
                let log = log.clone();
                move || log.push("timer")
            },
            ms(0),
        );

        log.push("sync 1");

        lp.enqueue_microtask({
            let log = log.clone();
            move || log.push("microtask")
        });

        log.push("sync 2");
    });

    assert_eq!(
        log.snapshot(),
        vec!["sync 1", "sync 2", "microtask", "timer"],
        "Synchronous code and microtasks should run before a zero-delay timer"
    );
}

#[test]
fn test_same_deadline_timers_fire_in_schedule_order() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    for (name, delay) in [("A", 10), ("B", 10), ("C", 5), ("D", 10)] {
        let log = log.clone();
        lp.schedule_timeout(move || log.push(name), ms(delay));
    }

    lp.advance_clock(ms(10)).expect("virtual clock");
    lp.run_until_idle();

    assert_eq!(log.snapshot(), vec!["C", "A", "B", "D"]);
}

#[test]
fn test_fired_timer_waits_behind_queued_tasks() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    lp.schedule_timeout(
        {
            let log = log.clone();
            move || log.push("timer")
        },
        ms(0),
    );

    for name in ["T1", "T2"] {
        let log = log.clone();
        lp.enqueue_task(move || log.push(name));
    }

    lp.run_until_idle();

    assert_eq!(log.snapshot(), vec!["T1", "T2", "timer"]);
}

#[test]
fn test_each_timer_gets_its_own_microtask_drain() {
    let lp = EventLoop::with_virtual_clock();
    let log = Recorder::new();

    for name in ["X", "Y"] {
        let lp2 = lp.clone();
        let log = log.clone();

        lp.schedule_timeout(
            move || {
                log.push(name);

                let log = log.clone();
                lp2.enqueue_microtask(move || log.push("microtask"));
            },
            ms(20),
        );
    }

    lp.run_for(ms(20)).expect("virtual clock");

    assert_eq!(log.snapshot(), vec!["X", "microtask", "Y", "microtask"]);
}

#[test]
fn test_block_on_returns_body_value() {
    let lp = EventLoop::with_virtual_clock();

    let value = lp.block_on(|lp| {
        lp.enqueue_task(|| ());
        42
    });

    assert_eq!(value, 42);
    assert!(lp.is_idle(), "block_on should leave the loop idle");
}
