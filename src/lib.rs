// src/lib.rs

//! # Flux Schedule
//!
//! Wrappers that control when, and how often, a callback runs:
//!
//! - [`postpone`] runs every call after a fixed wait, one timer per call.
//! - [`blocking_throttle`] runs the first call of a burst immediately and drops the rest of
//!   the burst until the cooldown window closes.
//! - [`deferring_throttle`] does the same but remembers the last dropped call and runs it
//!   once when the window closes.
//!
//! Timers come from a [`Scheduler`]; [`TokioScheduler`] runs them on the tokio runtime.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::time::Duration;
//! use flux_schedule::{Admission, TokioScheduler, deferring_throttle};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let resize = deferring_throttle(
//!     |(width, height): (u32, u32)| println!("resized to {width}x{height}"),
//!     Duration::from_millis(40),
//!     TokioScheduler::new(),
//! );
//!
//! assert_eq!(resize.call((800, 600)).unwrap(), Admission::Invoked);
//! // arrives inside the window: replayed once the window closes
//! assert_eq!(resize.call((1024, 768)).unwrap(), Admission::Deferred);
//! # }
//! ```

// private modules
mod admission;
mod blocking;
mod config;
mod context;
mod deferring;
mod errors;
mod keyed;
mod postpone;
mod scheduler;
mod shared;

// public API exports
pub use admission::Admission;
pub use blocking::{BlockingThrottle, blocking_throttle};
pub use config::ScheduleConfig;
pub use context::{bind, unbound};
pub use deferring::{DeferringThrottle, deferring_throttle};
pub use errors::ScheduleError;
pub use keyed::{KeyedThrottle, ThrottleMode};
pub use postpone::{Postpone, postpone};
pub use scheduler::{Scheduler, SchedulerError, Task, TimerHandle, TokioScheduler};
