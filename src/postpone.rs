// src/postpone.rs

// postpone: run every call of a callback after a fixed delay

// dependencies
use crate::config::ScheduleConfig;
use crate::errors::ScheduleError;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::shared::Callback;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

/// Delays every call by a fixed wait.
/// A is the argument tuple forwarded to the callback.
/// S is the scheduler type, defaulting to TokioScheduler.
/// Calls are never coalesced: each one owns its own timer and its own arguments.
pub struct Postpone<A, S = TokioScheduler>
where
    S: Scheduler,
{
    wait: Duration,
    label: Option<String>,
    callback: Callback<A>,
    pending: Arc<AtomicUsize>,
    scheduler: S,
}

/// Wrap `callback` so each call runs it `wait` later with the arguments it was given.
pub fn postpone<A, F, S>(callback: F, wait: Duration, scheduler: S) -> Postpone<A, S>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
    S: Scheduler,
{
    Postpone::new(wait, None, scheduler, Arc::new(callback))
}

impl<A, S> Postpone<A, S>
where
    A: Send + 'static,
    S: Scheduler,
{
    fn new(wait: Duration, label: Option<String>, scheduler: S, callback: Callback<A>) -> Self {
        Self {
            wait,
            label,
            callback,
            pending: Arc::new(AtomicUsize::new(0)),
            scheduler,
        }
    }

    // method to create a new postponed callback from a config object
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

    /// Schedule one invocation of the callback with `args`, `wait` from now.
    ///
    /// Fails only when the scheduler refuses the timer, in which case nothing is scheduled.
    pub fn call(&self, args: A) -> Result<(), ScheduleError> {
        let callback = Arc::clone(&self.callback);
        // released when the task runs, or when the scheduler drops it unrun
        let guard = PendingGuard::new(&self.pending);

        let scheduled = self.scheduler.schedule(
            self.wait,
            Box::new(move || {
                drop(guard);
                callback(args);
            }),
        );

        match scheduled {
            Ok(handle) => {
                trace!(
                    label = ?self.label,
                    timer = handle.id(),
                    wait_ms = self.wait.as_millis() as u64,
                    "call postponed"
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Number of postponed invocations that have not run yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

// one outstanding invocation in the pending count
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(pending))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<A, S> fmt::Debug for Postpone<A, S>
where
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Postpone")
            .field("wait", &self.wait)
            .field("label", &self.label)
            .field("pending", &self.pending.load(Ordering::Acquire))
            .finish()
    }
}
