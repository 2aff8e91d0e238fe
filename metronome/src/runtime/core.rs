use super::builder::EventLoopBuilder;
use super::callback::{self, CallbackResult, IntoCallbackResult, guarded};
use super::queue::{MicrotaskQueue, Task, TaskQueue};
use super::remote::{Inbox, RemoteHandle};
use crate::error::{CallbackError, ConfigurationError, Error, Result};
use crate::time::{Clock, ClockKind, Instant};
use crate::timer::{FiredCallback, FiredTimer, TimerCallback, TimerHandle, TimerSet};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, error, trace, warn};

/// Source of loop identifiers, so handles can be traced to their loop.
static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

/// Receives failures of callbacks that had no caller to return to.
pub(crate) type ErrorHook = Box<dyn FnMut(CallbackError)>;

/// State shared by every clone of an [`EventLoop`].
struct Inner {
    /// Unique identifier of this loop within the process.
    id: u64,

    /// Time source deadlines are compared against.
    clock: ClockKind,

    /// Discrete units of work, one per tick.
    tasks: TaskQueue,

    /// Continuations drained after every task.
    microtasks: MicrotaskQueue,

    /// Pending one-shot and repeating timers.
    timers: RefCell<TimerSet>,

    /// How many callbacks are currently on the stack.
    depth: Cell<usize>,

    /// Where failed callbacks are reported. `None` logs them.
    error_hook: RefCell<Option<ErrorHook>>,

    /// Tasks sent from other threads or loops.
    inbox: Inbox,
}

/// A single-threaded, cooperative event loop.
///
/// The loop owns three kinds of pending work:
/// - **tasks**, discrete units of work run one per tick,
/// - **microtasks**, continuations drained to exhaustion after every task,
/// - **timers**, which join the task queue once their deadline passes.
///
/// Every callback runs to completion; nothing is ever preempted. Given the
/// same clock readings and the same sequence of enqueue calls, execution
/// order is fully deterministic.
///
/// `EventLoop` is a cheap, reference-counted handle: clones drive the same
/// loop. It is bound to the thread that created it; use
/// [`remote`](Self::remote) to feed it from elsewhere.
///
/// # Examples
///
/// ```rust,ignore
/// let lp = EventLoop::with_virtual_clock();
///
/// lp.schedule_timeout(|| println!("later"), Duration::from_millis(10));
/// lp.enqueue_task(|| println!("first"));
///
/// lp.run_for(Duration::from_millis(10))?;
/// ```
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<Inner>,
}

/// A non-owning reference to an [`EventLoop`].
///
/// Long-lived callbacks stored inside the loop (intervals, for example)
/// can hold a `WeakEventLoop` to reach their loop without keeping it
/// alive.
#[derive(Clone)]
pub struct WeakEventLoop {
    inner: Weak<Inner>,
}

impl WeakEventLoop {
    /// Returns the loop if it still exists.
    pub fn upgrade(&self) -> Option<EventLoop> {
        self.inner.upgrade().map(|inner| EventLoop { inner })
    }
}

impl EventLoop {
    /// Creates an event loop driven by the system clock.
    pub fn new() -> Self {
        EventLoopBuilder::new().build()
    }

    /// Creates an event loop driven by a virtual clock starting at
    /// [`Instant::ZERO`].
    pub fn with_virtual_clock() -> Self {
        EventLoopBuilder::new().virtual_clock().build()
    }

    /// Returns a builder for a customized loop.
    pub fn builder() -> EventLoopBuilder {
        EventLoopBuilder::new()
    }

    pub(crate) fn from_parts(clock: ClockKind, error_hook: Option<ErrorHook>) -> Self {
        let id = NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed);
        debug!(id, ?clock, "event loop created");

        Self {
            inner: Rc::new(Inner {
                id,
                timers: RefCell::new(TimerSet::new(id)),
                clock,
                tasks: TaskQueue::new(),
                microtasks: MicrotaskQueue::new(),
                depth: Cell::new(0),
                error_hook: RefCell::new(error_hook),
                inbox: Inbox::new(),
            }),
        }
    }

    /// Current time according to the loop's clock.
    pub fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    /// Appends `callback` to the task queue.
    ///
    /// Enqueuing is always legal, including from inside a running callback.
    pub fn enqueue_task<F, R>(&self, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.inner
            .tasks
            .push(Task::Callback(callback::boxed(callback)));
    }

    /// Appends `callback` to the microtask queue.
    ///
    /// The microtask runs once the current task (or current synchronous
    /// work) has finished, before the next task.
    pub fn enqueue_microtask<F, R>(&self, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoCallbackResult,
    {
        self.inner.microtasks.push(callback::boxed(callback));
    }

    /// Runs `callback` once, no earlier than `delay` from now.
    ///
    /// A zero delay still defers the callback: it becomes a task on the
    /// next timer check and never runs inside the caller's stack.
    pub fn schedule_timeout<F, R>(&self, callback: F, delay: Duration) -> TimerHandle
    where
        F: FnOnce() -> R + 'static,
        R: IntoCallbackResult,
    {
        let now = self.now();
        self.inner.timers.borrow_mut().schedule(
            now,
            delay,
            TimerCallback::Once(callback::boxed(callback)),
        )
    }

    /// Like [`schedule_timeout`](Self::schedule_timeout), with a signed
    /// delay in milliseconds. Negative delays are treated as zero.
    pub fn schedule_timeout_millis<F, R>(&self, callback: F, delay_ms: i64) -> TimerHandle
    where
        F: FnOnce() -> R + 'static,
        R: IntoCallbackResult,
    {
        let delay = Duration::from_millis(u64::try_from(delay_ms).unwrap_or(0));
        self.schedule_timeout(callback, delay)
    }

    /// Runs `callback` every `interval`, starting `interval` from now.
    ///
    /// After each fire the next deadline is computed from the actual fire
    /// time, so a loop that falls behind fires once when it catches up
    /// rather than in a burst.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroInterval`] if `interval` is zero.
    pub fn schedule_interval<F, R>(&self, callback: F, interval: Duration) -> Result<TimerHandle>
    where
        F: FnMut() -> R + 'static,
        R: IntoCallbackResult,
    {
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval(interval).into());
        }

        let now = self.now();
        let handle = self.inner.timers.borrow_mut().schedule(
            now,
            interval,
            TimerCallback::Repeat {
                interval,
                callback: Rc::new(RefCell::new(callback::boxed_repeat(callback))),
            },
        );

        Ok(handle)
    }

    /// Cancels a timeout or an interval.
    ///
    /// Once this returns, the timer's callback will not start again, even
    /// if its deadline has already passed. Clearing a timer that already
    /// fired or was already cleared does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if `handle` was issued by another
    /// loop.
    pub fn clear_timer(&self, handle: TimerHandle) -> Result<()> {
        if handle.loop_id() != self.inner.id {
            return Err(Error::InvalidHandle(handle));
        }

        self.cancel_timer(handle);
        Ok(())
    }

    /// Cancels a handle known to belong to this loop.
    pub(crate) fn cancel_timer(&self, handle: TimerHandle) -> bool {
        self.inner.timers.borrow_mut().cancel(handle)
    }

    /// Performs exactly one tick.
    ///
    /// A tick:
    /// 1. moves remotely injected callbacks into the task queue,
    /// 2. runs the oldest task, if any,
    /// 3. drains the microtask queue,
    /// 4. queues a task for every timer whose deadline has passed.
    ///
    /// Returns `true` if any work was done or queued. Calls made from
    /// inside a running callback are ignored and return `false`.
    pub fn step(&self) -> bool {
        if self.is_reentrant("step") {
            return false;
        }

        let mut progressed = false;

        for task in self.inner.inbox.try_drain() {
            self.inner.tasks.push(Task::Callback(task));
        }

        if let Some(task) = self.inner.tasks.pop() {
            self.run_task(task);
            progressed = true;
        }

        if self.drain_microtasks() > 0 {
            progressed = true;
        }

        let now = self.now();
        let ready = self.inner.timers.borrow_mut().pop_ready(now);

        for fired in ready {
            trace!(handle = %fired.handle, %now, "timer ready");
            self.inner.tasks.push(Task::Timer(fired));
            progressed = true;
        }

        progressed
    }

    /// Runs ticks until there is no task, no microtask and no timer ready
    /// at the current time.
    ///
    /// Returns the number of ticks that did work.
    pub fn run_until_idle(&self) -> usize {
        if self.is_reentrant("run_until_idle") {
            return 0;
        }

        let mut ticks = 0;
        while self.step() {
            ticks += 1;
        }

        debug!(ticks, now = %self.now(), timers = self.pending_timers(), "event loop idle");
        ticks
    }

    /// Runs the loop until no work and no timers remain.
    ///
    /// Between bursts of work the loop waits for the next deadline: a
    /// system clock sleeps (waking early if a remote task arrives), a
    /// virtual clock jumps straight to it. A loop with a live interval
    /// therefore only returns once the interval is cleared.
    pub fn run(&self) {
        if self.is_reentrant("run") {
            return;
        }

        loop {
            self.run_until_idle();

            let Some(deadline) = self.next_deadline() else {
                debug!(now = %self.now(), "no timers left, event loop stopping");
                return;
            };

            match &self.inner.clock {
                ClockKind::Virtual(clock) => clock.advance_to(deadline),
                ClockKind::System(clock) => {
                    let wait = deadline.saturating_duration_since(clock.now());

                    if let Some(task) = self.inner.inbox.wait(wait) {
                        self.inner.tasks.push(Task::Callback(task));
                    }
                }
            }
        }
    }

    /// Runs `f` as the loop's current synchronous work, then drains
    /// microtasks and runs until idle.
    ///
    /// This is the synchronous entry point used by `#[metronome::main]`
    /// and `#[metronome::test]`.
    pub fn block_on<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&EventLoop) -> T,
    {
        let output = f(self);

        if !self.is_reentrant("block_on") {
            self.drain_microtasks();
            self.run_until_idle();
        }

        output
    }

    /// Moves a virtual clock forward by `duration`.
    ///
    /// Nothing runs as a side effect; timers that became due fire on the
    /// next [`step`](Self::step) or [`run_until_idle`](Self::run_until_idle).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RealClock`] on a loop driven by the system clock.
    pub fn advance_clock(&self, duration: Duration) -> Result<()> {
        let clock = self.inner.clock.as_virtual().ok_or(Error::RealClock)?;

        clock.advance(duration);
        debug!(now = %clock.now(), "virtual clock advanced");

        Ok(())
    }

    /// Lets `duration` of virtual time pass, running everything that
    /// becomes due along the way.
    ///
    /// The clock stops at every intermediate deadline and the loop is run
    /// until idle there, so callbacks observe the time they were due at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RealClock`] on a loop driven by the system clock.
    pub fn run_for(&self, duration: Duration) -> Result<()> {
        let clock = self.inner.clock.as_virtual().ok_or(Error::RealClock)?;

        if self.is_reentrant("run_for") {
            return Ok(());
        }

        let target = clock.now() + duration;
        self.run_until_idle();

        while let Some(deadline) = self.next_deadline() {
            if deadline > target {
                break;
            }

            clock.advance_to(deadline);
            self.run_until_idle();
        }

        clock.advance_to(target);
        self.run_until_idle();

        Ok(())
    }

    /// Number of timers that may still run.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.timers.borrow_mut().next_deadline()
    }

    /// Returns `true` if a tick at the current time would do nothing.
    pub fn is_idle(&self) -> bool {
        self.inner.tasks.is_empty()
            && self.inner.microtasks.is_empty()
            && self.next_deadline().is_none_or(|deadline| deadline > self.now())
    }

    /// Returns `true` while a callback of this loop is executing.
    pub fn is_running_callback(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Installs the hook receiving failures of callbacks run by the loop.
    ///
    /// Without a hook, failures are logged at the `error` level.
    pub fn set_error_hook<F>(&self, hook: F)
    where
        F: FnMut(CallbackError) + 'static,
    {
        *self.inner.error_hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Returns a thread-safe handle that enqueues tasks into this loop.
    pub fn remote(&self) -> RemoteHandle {
        self.inner.inbox.handle()
    }

    /// Returns a non-owning reference to this loop.
    pub fn downgrade(&self) -> WeakEventLoop {
        WeakEventLoop {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Hands a callback failure to the error hook.
    pub(crate) fn report(&self, error: CallbackError) {
        let hook = self.inner.error_hook.borrow_mut().take();

        let Some(mut hook) = hook else {
            error!(%error, "unhandled callback error");
            return;
        };

        if let Err(panic) = guarded(|| {
            hook(error);
            Ok(())
        }) {
            error!(error = %panic, "error hook failed");
        }

        // The hook may have installed a replacement while it ran.
        let mut slot = self.inner.error_hook.borrow_mut();
        if slot.is_none() {
            *slot = Some(hook);
        }
    }

    /// Runs a callback, reporting its failure to the error hook.
    fn invoke(&self, callback: impl FnOnce() -> CallbackResult) {
        let depth = &self.inner.depth;

        depth.set(depth.get() + 1);
        let result = guarded(callback);
        depth.set(depth.get() - 1);

        if let Err(error) = result {
            self.report(error);
        }
    }

    fn run_task(&self, task: Task) {
        match task {
            Task::Callback(callback) => self.invoke(callback),
            Task::Timer(fired) => self.run_timer(fired),
        }
    }

    fn run_timer(&self, fired: FiredTimer) {
        let FiredTimer {
            handle,
            cancelled,
            callback,
        } = fired;

        if cancelled.get() {
            trace!(%handle, "skipping cancelled timer");
            return;
        }

        trace!(%handle, now = %self.now(), "timer fired");

        match callback {
            FiredCallback::Once(callback) => {
                self.inner.timers.borrow_mut().retire(handle);
                self.invoke(callback);
            }

            // Ticks never nest, so the interval's callback is never borrowed here.
            FiredCallback::Repeat(callback) => self.invoke(move || {
                let mut repeat = callback.borrow_mut();
                (&mut *repeat)()
            }),
        }
    }

    fn drain_microtasks(&self) -> usize {
        self.inner.microtasks.drain(|callback| self.invoke(callback))
    }

    /// Returns `true` (and warns) if a callback is on the stack.
    fn is_reentrant(&self, operation: &'static str) -> bool {
        if self.is_running_callback() {
            warn!(operation, "event loop driven from inside a callback; ignored");
            return true;
        }

        false
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("id", &self.inner.id)
            .field("now", &self.now())
            .field("tasks", &self.inner.tasks.len())
            .field("microtasks", &self.inner.microtasks.len())
            .field("timers", &self.pending_timers())
            .finish()
    }
}
