// src/errors.rs

// error handling for the schedule wrappers

// dependencies
use std::error::Error;
use std::fmt;

use crate::scheduler::SchedulerError;

/// Error type for wrapper configuration and timer issues.
#[non_exhaustive]
#[derive(Debug)]
pub enum ScheduleError {
    InvalidWait,                    // for wait < 0, NaN, infinite or too large
    SchedulerError(SchedulerError), // the timer for a call could not be armed
}

// implement the Display trait for the ScheduleError type
impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleError::InvalidWait => {
                write!(f, "Wait must be a finite, non-negative number of milliseconds")
            }
            ScheduleError::SchedulerError(err) => write!(f, "Timer error: {}", err),
        }
    }
}

// implement the Error trait for the ScheduleError type
impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScheduleError::InvalidWait => None,
            ScheduleError::SchedulerError(err) => Some(err),
        }
    }
}

impl From<SchedulerError> for ScheduleError {
    fn from(err: SchedulerError) -> Self {
        ScheduleError::SchedulerError(err)
    }
}
