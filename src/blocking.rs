// src/blocking.rs

// blocking throttle: leading-edge rate limiting, calls inside the cooldown window are dropped

// dependencies
use crate::admission::Admission;
use crate::config::ScheduleConfig;
use crate::errors::ScheduleError;
use crate::scheduler::{Scheduler, SchedulerError, TimerHandle, TokioScheduler};
use crate::shared::{Callback, lock};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

/// Leading-edge throttle.
/// The first call runs the callback immediately and opens a cooldown window of `wait`;
/// every call until the window closes is dropped.
/// Clones share the same window.
pub struct BlockingThrottle<A, S = TokioScheduler>
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
    gate: Mutex<Gate>,
}

// Idle: blocked == false, Cooldown: blocked == true
#[derive(Debug, Default)]
struct Gate {
    blocked: bool,
    timer: Option<TimerHandle>,
}

/// Wrap `callback` so it runs at most once per `wait` window, on the first call of the window.
pub fn blocking_throttle<A, F, S>(
    callback: F,
    wait: Duration,
    scheduler: S,
) -> BlockingThrottle<A, S>
where
    A: 'static,
    F: Fn(A) + Send + Sync + 'static,
    S: Scheduler + 'static,
{
    BlockingThrottle::new(wait, None, scheduler, Arc::new(callback))
}

impl<A, S> BlockingThrottle<A, S>
where
    A: 'static,
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
                gate: Mutex::new(Gate::default()),
            }),
        }
    }

    // method to create a new blocking throttle from a config object
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
    /// Runs the callback synchronously when no window is open and reports
    /// [`Admission::Invoked`]; otherwise the call is discarded and [`Admission::Dropped`]
    /// is reported. If the window timer cannot be armed the throttle stays idle, the
    /// callback does not run, and the scheduler error is returned.
    pub fn call(&self, args: A) -> Result<Admission, ScheduleError> {
        {
            let mut gate = lock(&self.inner.gate);
            if gate.blocked {
                trace!(
                    label = ?self.inner.label,
                    decision = %Admission::Dropped,
                    "call during cooldown"
                );
                return Ok(Admission::Dropped);
            }

            // arm before invoking so a panicking callback cannot leave the gate shut
            let timer = self.inner.arm()?;
            gate.blocked = true;
            gate.timer = Some(timer);
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
        lock(&self.inner.gate).blocked
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
    A: 'static,
    S: Scheduler + 'static,
{
    fn arm(self: &Arc<Self>) -> Result<TimerHandle, SchedulerError> {
        let inner = Arc::clone(self);
        self.scheduler.schedule(self.wait, Box::new(move || inner.release()))
    }

    fn release(&self) {
        let mut gate = lock(&self.gate);
        gate.blocked = false;
        gate.timer = None;
        trace!(label = ?self.label, "cooldown window closed");
    }
}

impl<A, S> Clone for BlockingThrottle<A, S>
where
    S: Scheduler,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> fmt::Debug for BlockingThrottle<A, S>
where
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = lock(&self.inner.gate);
        f.debug_struct("BlockingThrottle")
            .field("wait", &self.inner.wait)
            .field("label", &self.inner.label)
            .field("blocked", &gate.blocked)
            .field("timer", &gate.timer)
            .finish()
    }
}
