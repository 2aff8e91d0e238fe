mod common;

use common::{Recorder, ms, run_to};
use metronome::tools::{Debounce, DebounceOptions};
use metronome::{CallbackError, ConfigurationError, Error, EventLoop, debounce};

use std::cell::RefCell;
use std::rc::Rc;

/// Debounced operation recording `(now, argument)` on every call.
fn recorded(
    lp: &EventLoop,
    delay: u64,
    options: DebounceOptions,
) -> (Debounce<&'static str>, Recorder<(u128, &'static str)>) {
    let calls: Recorder<(u128, &'static str)> = Recorder::new();

    let op = debounce(
        lp,
        {
            let lp = lp.downgrade();
            let calls = calls.clone();
            move |arg: &'static str| {
                let now = lp.upgrade().expect("loop alive").now();
                calls.push((now.as_millis(), arg));
            }
        },
        ms(delay),
        options,
    )
    .expect("valid options");

    (op, calls)
}

#[test]
fn test_burst_collapses_into_one_trailing_call() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default());

    for (at, arg) in [(0, "a"), (50, "b"), (90, "c")] {
        run_to(&lp, at);
        op.invoke(arg).expect("trailing-only invoke never runs the operation");
    }

    run_to(&lp, 189);
    assert_eq!(calls.len(), 0, "Quiet period restarts on every call");
    assert!(op.is_pending());

    run_to(&lp, 500);
    assert_eq!(calls.snapshot(), vec![(190, "c")]);
    assert!(!op.is_pending());
}

#[test]
fn test_separate_bursts_fire_separately() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default());

    op.invoke("a").expect("invoke");
    run_to(&lp, 150);
    op.invoke("b").expect("invoke");
    run_to(&lp, 400);

    assert_eq!(calls.snapshot(), vec![(100, "a"), (250, "b")]);
}

#[test]
fn test_leading_and_trailing_edges() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default().leading(true));

    for (at, arg) in [(0, "a"), (30, "b"), (60, "c")] {
        run_to(&lp, at);
        op.invoke(arg).expect("invoke");
    }

    assert_eq!(calls.snapshot(), vec![(0, "a")], "Leading call runs immediately");

    run_to(&lp, 300);
    assert_eq!(calls.snapshot(), vec![(0, "a"), (160, "c")]);
}

#[test]
fn test_single_call_fires_on_both_edges() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default().leading(true));

    op.invoke("x").expect("invoke");
    run_to(&lp, 500);

    assert_eq!(
        calls.snapshot(),
        vec![(0, "x"), (100, "x")],
        "Every burst should fire its trailing call once"
    );
}

#[test]
fn test_leading_only_waits_for_quiet_period_before_next_call() {
    let lp = EventLoop::with_virtual_clock();
    let options = DebounceOptions::default().leading(true).trailing(false);
    let (op, calls) = recorded(&lp, 100, options);

    op.invoke("a").expect("invoke");
    run_to(&lp, 50);
    op.invoke("b").expect("invoke");
    run_to(&lp, 140);
    op.invoke("ignored").expect("invoke");

    run_to(&lp, 550);
    op.invoke("c").expect("invoke");

    assert_eq!(calls.snapshot(), vec![(0, "a"), (550, "c")]);
}

#[test]
fn test_flush_runs_pending_call_now() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default());

    op.invoke("a").expect("invoke");
    run_to(&lp, 40);
    op.flush().expect("flush");

    assert_eq!(calls.snapshot(), vec![(40, "a")]);
    assert!(!op.is_pending());

    run_to(&lp, 500);
    assert_eq!(calls.len(), 1, "Flushed call must not run again");

    op.flush().expect("flush with nothing pending");
    assert_eq!(calls.len(), 1);
}

#[test]
fn test_cancel_drops_pending_call() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default());

    op.invoke("a").expect("invoke");
    op.cancel();

    assert!(!op.is_pending());
    assert_eq!(lp.pending_timers(), 0);

    run_to(&lp, 500);
    assert_eq!(calls.len(), 0);
}

#[test]
fn test_drop_cancels_pending_call() {
    let lp = EventLoop::with_virtual_clock();
    let (op, calls) = recorded(&lp, 100, DebounceOptions::default());

    op.invoke("a").expect("invoke");
    drop(op);

    assert_eq!(lp.pending_timers(), 0);

    run_to(&lp, 500);
    assert_eq!(calls.len(), 0);
}

#[test]
fn test_leading_failure_is_returned_to_caller() {
    let lp = EventLoop::with_virtual_clock();

    let op = debounce(
        &lp,
        |_: ()| Err::<(), _>("leading boom"),
        ms(100),
        DebounceOptions::default().leading(true).trailing(false),
    )
    .expect("valid options");

    let result = op.invoke(());

    assert!(matches!(result, Err(CallbackError::Failed(_))));
    assert_eq!(
        result.map_err(|err| err.to_string()),
        Err("callback failed: leading boom".to_string())
    );
}

#[test]
fn test_trailing_failure_goes_to_error_hook() {
    let lp = EventLoop::with_virtual_clock();
    let errors = Recorder::new();

    lp.set_error_hook({
        let errors = errors.clone();
        move |err| errors.push(err.to_string())
    });

    let op = debounce(
        &lp,
        |_: ()| Err::<(), _>("trailing boom"),
        ms(100),
        DebounceOptions::default(),
    )
    .expect("valid options");

    op.invoke(()).expect("trailing-only invoke never runs the operation");
    run_to(&lp, 200);

    assert_eq!(
        errors.snapshot(),
        vec!["callback failed: trailing boom".to_string()]
    );
}

#[test]
fn test_no_edges_is_rejected() {
    let lp = EventLoop::with_virtual_clock();

    let result = debounce(
        &lp,
        |_: ()| (),
        ms(100),
        DebounceOptions::default().trailing(false),
    );

    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::NoEdge("debounce")))
    ));
}

#[test]
fn test_operation_reentering_its_wrapper_is_rejected() {
    let lp = EventLoop::with_virtual_clock();
    let slot: Rc<RefCell<Option<Debounce<u32>>>> = Rc::new(RefCell::new(None));
    let nested = Recorder::new();

    let op = debounce(
        &lp,
        {
            let slot = slot.clone();
            let nested = nested.clone();
            move |arg: u32| {
                if arg != 0 {
                    return;
                }

                let slot = slot.borrow();
                let Some(own) = slot.as_ref() else {
                    return;
                };

                nested.push(own.invoke(9).is_ok());
                nested.push(matches!(own.flush(), Err(CallbackError::Reentrant)));
            }
        },
        ms(100),
        DebounceOptions::default().leading(true),
    )
    .expect("valid options");

    *slot.borrow_mut() = Some(op);
    slot.borrow()
        .as_ref()
        .expect("wrapper installed")
        .invoke(0)
        .expect("leading call");

    assert_eq!(
        nested.snapshot(),
        vec![true, true],
        "Flushing from inside the operation should report reentry"
    );

    slot.borrow_mut().take();
}
