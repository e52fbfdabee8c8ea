// src/keyed.rs

// keyed throttles: one independent throttle per key, sharing a callback and a scheduler

// dependencies
use crate::admission::Admission;
use crate::blocking::BlockingThrottle;
use crate::config::ScheduleConfig;
use crate::deferring::DeferringThrottle;
use crate::errors::ScheduleError;
use crate::scheduler::{Scheduler, TokioScheduler};
use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Which throttle each key gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleMode {
    /// Calls inside a window are dropped.
    Blocking,
    /// The last call inside a window is replayed when it closes.
    Deferring,
}

/// A set of throttles keyed by K.
/// K is the type used to identify call sources (e.g., String, u64, etc.).
/// A is the argument tuple forwarded to the callback.
/// S is the scheduler type, defaulting to TokioScheduler.
/// We use `Arc<DashMap>` for thread-safe concurrent access to per-key throttles.
pub struct KeyedThrottle<K, A, S = TokioScheduler>
where
    K: Hash + Eq + Clone,
    S: Scheduler,
{
    wait: Duration,
    label: Option<String>,
    mode: ThrottleMode,
    callback: Arc<dyn Fn(&K, A) + Send + Sync>,
    throttles: Arc<DashMap<K, Slot<A, Arc<S>>>>,
    scheduler: Arc<S>,
}

enum Slot<A, S>
where
    S: Scheduler,
{
    Blocking(BlockingThrottle<A, S>),
    Deferring(DeferringThrottle<A, S>),
}

impl<A, S> Slot<A, S>
where
    A: Send + 'static,
    S: Scheduler + 'static,
{
    fn call(&self, args: A) -> Result<Admission, ScheduleError> {
        match self {
            Slot::Blocking(throttle) => throttle.call(args),
            Slot::Deferring(throttle) => throttle.call(args),
        }
    }

    // an idle deferring throttle never holds deferred arguments
    fn is_idle(&self) -> bool {
        match self {
            Slot::Blocking(throttle) => !throttle.is_blocked(),
            Slot::Deferring(throttle) => !throttle.is_blocked(),
        }
    }

    fn is_shared(&self) -> bool {
        match self {
            Slot::Blocking(throttle) => throttle.is_shared(),
            Slot::Deferring(throttle) => throttle.is_shared(),
        }
    }
}

impl<A, S> Clone for Slot<A, S>
where
    S: Scheduler,
{
    fn clone(&self) -> Self {
        match self {
            Slot::Blocking(throttle) => Slot::Blocking(throttle.clone()),
            Slot::Deferring(throttle) => Slot::Deferring(throttle.clone()),
        }
    }
}

impl<K, A, S> KeyedThrottle<K, A, S>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    A: Send + 'static,
    S: Scheduler + 'static,
{
    // method to create a new keyed throttle from a config object
    pub fn with_config<F>(
        config: ScheduleConfig,
        mode: ThrottleMode,
        scheduler: S,
        callback: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn(&K, A) + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            wait: config.wait(),
            label: config.label,
            mode,
            callback: Arc::new(callback),
            throttles: Arc::new(DashMap::new()),
            scheduler: Arc::new(scheduler),
        })
    }

    /// Offer a call from `key` to that key's throttle, creating the throttle on first use.
    pub fn call(&self, key: K, args: A) -> Result<Admission, ScheduleError> {
        // clone the slot out so the map shard is not locked while the callback runs
        let slot = self
            .throttles
            .entry(key.clone())
            .or_insert_with(|| self.build(key))
            .value()
            .clone();
        slot.call(args)
    }

    fn build(&self, key: K) -> Slot<A, Arc<S>> {
        debug!(label = ?self.label, mode = ?self.mode, "creating throttle for new key");
        let callback = Arc::clone(&self.callback);
        let bound = Arc::new(move |args: A| callback(&key, args));
        let scheduler = Arc::clone(&self.scheduler);
        match self.mode {
            ThrottleMode::Blocking => Slot::Blocking(BlockingThrottle::new(
                self.wait,
                self.label.clone(),
                scheduler,
                bound,
            )),
            ThrottleMode::Deferring => Slot::Deferring(DeferringThrottle::new(
                self.wait,
                self.label.clone(),
                scheduler,
                bound,
            )),
        }
    }

    /// Drop the throttles of keys with no open window and return how many were removed.
    /// Throttles held by a call in progress are kept.
    /// A removed key starts over with a fresh throttle on its next call.
    pub fn cleanup_idle(&self) -> usize {
        let mut removed = 0;
        // a slot cloned out by a `call` in progress may be about to open a window
        self.throttles.retain(|_, slot| {
            let keep = !slot.is_idle() || slot.is_shared();
            if !keep {
                removed += 1;
            }
            keep
        });
        debug!(
            label = ?self.label,
            removed,
            remaining = self.throttles.len(),
            "cleaned up idle throttles"
        );
        removed
    }

    /// Whether `key` currently has an open cooldown window.
    pub fn is_blocked(&self, key: &K) -> bool {
        self.throttles
            .get(key)
            .map(|slot| !slot.is_idle())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.throttles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.throttles.is_empty()
    }

    pub fn mode(&self) -> ThrottleMode {
        self.mode
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<K, A, S> fmt::Debug for KeyedThrottle<K, A, S>
where
    K: Hash + Eq + Clone,
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedThrottle")
            .field("wait", &self.wait)
            .field("label", &self.label)
            .field("mode", &self.mode)
            .field("keys", &self.throttles.len())
            .finish()
    }
}
