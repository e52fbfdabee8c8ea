// src/deferring.rs

// deferring throttle: leading-edge rate limiting with one trailing call per busy window

// dependencies
use crate::admission::Admission;
use crate::config::ScheduleConfig;
use crate::errors::ScheduleError;
use crate::scheduler::{Scheduler, SchedulerError, TimerHandle, TokioScheduler};
use crate::shared::{Callback, lock};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{trace, warn};

/// Leading-edge throttle that never loses the last call of a burst.
/// A is the argument tuple forwarded to the callback.
/// S is the scheduler type, defaulting to TokioScheduler.
///
/// The first call runs immediately and opens a cooldown window of `wait`. Calls arriving
/// inside the window are not run; only the arguments of the most recent one are kept. When
/// the window closes with arguments pending, the callback runs once with them and a fresh
/// window opens, which can collect further calls in turn.
///
/// Clones share the same window.
pub struct DeferringThrottle<A, S = TokioScheduler>
where
    S: Scheduler,
{
    inner: Arc<Inner<A, S>>,
}

struct Inner<A, S> {
    wait: Duration,
    label: Option<String>,
    callback: Callback<A>,
    scheduler: S,
    window: Mutex<Window<A>>,
}

/// Window state.
/// Idle: `!blocked`. Cooldown (clean): `blocked && latest.is_none()`.
/// Cooldown (deferred): `blocked && latest.is_some()`.
struct Window<A> {
    blocked: bool,
    latest: Option<A>,
    timer: Option<TimerHandle>,
}

// what the window timer does when it fires
enum Close<A> {
    Release,
    Replay(A),
}

impl<A> Window<A> {
    fn new() -> Self {
        Self {
            blocked: false,
            latest: None,
            timer: None,
        }
    }

    fn open(&mut self, timer: TimerHandle) {
        self.blocked = true;
        self.latest = None;
        self.timer = Some(timer);
    }

    fn defer(&mut self, args: A) {
        self.latest = Some(args);
    }

    // a replay keeps the window blocked; the caller re-arms it
    fn close(&mut self) -> Close<A> {
        self.timer = None;
        match self.latest.take() {
            Some(args) => Close::Replay(args),
            None => {
                self.blocked = false;
                Close::Release
            }
        }
    }
}

/// Wrap `callback` so it runs on the first call of each `wait` window and once more, with
/// the latest arguments, after any window that received extra calls.
pub fn deferring_throttle<A, F, S>(
    callback: F,
    wait: Duration,
    scheduler: S,
) -> DeferringThrottle<A, S>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
    S: Scheduler + 'static,
{
    DeferringThrottle::new(wait, None, scheduler, Arc::new(callback))
}

impl<A, S> DeferringThrottle<A, S>
where
    A: Send + 'static,
    S: Scheduler + 'static,
{
    pub(crate) fn new(
        wait: Duration,
        label: Option<String>,
        scheduler: S,
        callback: Callback<A>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                wait,
                label,
                callback,
                scheduler,
                window: Mutex::new(Window::new()),
            }),
        }
    }

    // method to create a new deferring throttle from a config object
    pub fn with_config<F>(
        config: ScheduleConfig,
        scheduler: S,
        callback: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        config.validate()?;
        let wait = config.wait();
        Ok(Self::new(wait, config.label, scheduler, Arc::new(callback)))
    }

    /// Offer a call to the throttle.
    ///
    /// Runs the callback synchronously and reports [`Admission::Invoked`] when no window is
    /// open. Inside a window the arguments replace any earlier deferred ones and
    /// [`Admission::Deferred`] is reported. If the window timer cannot be armed the throttle
    /// stays idle, the callback does not run, and the scheduler error is returned.
    pub fn call(&self, args: A) -> Result<Admission, ScheduleError> {
        {
            let mut window = lock(&self.inner.window);
            if window.blocked {
                window.defer(args);
                trace!(
                    label = ?self.inner.label,
                    decision = %Admission::Deferred,
                    "call during cooldown"
                );
                return Ok(Admission::Deferred);
            }

            let timer = self.inner.arm()?;
            window.open(timer);
        }

        trace!(
            label = ?self.inner.label,
            decision = %Admission::Invoked,
            "cooldown window opened"
        );
        (self.inner.callback)(args);
        Ok(Admission::Invoked)
    }

    /// Whether a cooldown window is currently open.
    pub fn is_blocked(&self) -> bool {
        lock(&self.inner.window).blocked
    }

    /// Whether a call is waiting for the current window to close.
    pub fn has_deferred(&self) -> bool {
        lock(&self.inner.window).latest.is_some()
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    // another handle or a pending timer task still holds the state
    pub(crate) fn is_shared(&self) -> bool {
        Arc::strong_count(&self.inner) > 1
    }
}

impl<A, S> Inner<A, S>
where
    A: Send + 'static,
    S: Scheduler + 'static,
{
    fn arm(self: &Arc<Self>) -> Result<TimerHandle, SchedulerError> {
        let inner = Arc::clone(self);
        self.scheduler
            .schedule(self.wait, Box::new(move || inner.on_window_closed()))
    }

    // Each replay arms a brand new timer task from the shared state, so a long burst costs one
    // pending task at a time.
    fn on_window_closed(self: &Arc<Self>) {
        let args = {
            let mut window = lock(&self.window);
            match window.close() {
                Close::Release => {
                    trace!(label = ?self.label, "cooldown window closed");
                    return;
                }
                Close::Replay(args) => {
                    match self.arm() {
                        Ok(timer) => window.timer = Some(timer),
                        Err(err) => {
                            warn!(
                                label = ?self.label,
                                error = %err,
                                "could not re-arm cooldown window, releasing"
                            );
                            window.blocked = false;
                        }
                    }
                    args
                }
            }
        };

        trace!(
            label = ?self.label,
            decision = %Admission::Invoked,
            "replaying deferred call"
        );
        (self.callback)(args);
    }
}

impl<A, S> Clone for DeferringThrottle<A, S>
where
    S: Scheduler,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> fmt::Debug for DeferringThrottle<A, S>
where
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = lock(&self.inner.window);
        f.debug_struct("DeferringThrottle")
            .field("wait", &self.inner.wait)
            .field("label", &self.inner.label)
            .field("blocked", &window.blocked)
            .field("deferred", &window.latest.is_some())
            .field("timer", &window.timer)
            .finish()
    }
}
