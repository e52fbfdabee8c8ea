// src/scheduler.rs

// scheduler module definition and implementations

// dependencies
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;

/// A unit of deferred work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler trait to abstract single-shot timers.
/// Implementors must be thread-safe (Send + Sync).
/// `schedule` runs `task` at most once, no earlier than `delay` after the call. A task
/// dropped without running (runtime shutdown) releases what it captured.
/// The task may start on another thread before `schedule` has returned; callers that need
/// the handle first must synchronise with the task through their own state, as the
/// throttles do by arming under their state lock.
/// This trait allows for different scheduler implementations, such as the tokio runtime or a
/// virtual-time scheduler in tests.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerHandle, SchedulerError>;
}

impl<S> Scheduler for Arc<S>
where
    S: Scheduler + ?Sized,
{
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerHandle, SchedulerError> {
        (**self).schedule(delay, task)
    }
}

/// Opaque handle to a scheduled timer.
/// Ids are unique per scheduler instance, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Scheduler error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    NoRuntime, // no tokio runtime to spawn the timer on
    Rejected,  // the scheduler refused the task
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchedulerError::NoRuntime => write!(f, "no tokio runtime available to run the timer"),
            SchedulerError::Rejected => write!(f, "scheduler rejected the timer"),
        }
    }
}

impl Error for SchedulerError {}

/// TokioScheduler implementation using `tokio::time::sleep`.
/// Every timer is a spawned task that sleeps for the delay and then runs its work.
/// Without an explicit handle the runtime is looked up at scheduling time, so the
/// scheduler can be built anywhere but must be used from inside a runtime.
/// This is the default scheduler for every wrapper.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
    next_id: Arc<AtomicU64>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the scheduler to a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Pin the scheduler to the runtime of the calling context.
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::with_handle)
            .map_err(|_| SchedulerError::NoRuntime)
    }

    fn runtime(&self) -> Result<Handle, SchedulerError> {
        match &self.handle {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| SchedulerError::NoRuntime),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerHandle, SchedulerError> {
        let runtime = self.runtime()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // a panicking task only takes down its own spawned future
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });

        Ok(TimerHandle::new(id))
    }
}
