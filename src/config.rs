// src/config.rs

//! Configuration types for the schedule wrappers

// dependencies
use crate::errors::ScheduleError;
use std::time::Duration;

/// Configuration shared by every wrapper: how long to wait, and an optional label that shows
/// up in trace output.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub(crate) wait_ms: f64,
    pub(crate) label: Option<String>,
}

impl ScheduleConfig {
    /// Create a new configuration with a wait period in milliseconds
    pub fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            label: None,
        }
    }

    /// Create a configuration from an exact duration
    pub fn from_duration(wait: Duration) -> Self {
        Self::new(wait.as_nanos() as f64 / 1_000_000.0)
    }

    /// Builder-style: set the wait period in milliseconds
    pub fn wait_ms(mut self, wait_ms: f64) -> Self {
        self.wait_ms = wait_ms;
        self
    }

    /// Builder-style: name the wrapper in trace output
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate the configuration.
    ///
    /// Negative, NaN and infinite waits are rejected, as are waits too large to express in
    /// nanoseconds. Zero is accepted: the window closes on the scheduler's next turn.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.wait_ms.is_finite() || self.wait_ms < 0.0 {
            return Err(ScheduleError::InvalidWait);
        }
        if self.wait_ms * 1_000_000.0 > u64::MAX as f64 {
            return Err(ScheduleError::InvalidWait);
        }
        Ok(())
    }

    // only meaningful once validate() has passed
    pub(crate) fn wait(&self) -> Duration {
        Duration::from_nanos((self.wait_ms * 1_000_000.0).round() as u64)
    }
}
