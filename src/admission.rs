// src/admission.rs

// dependencies
use std::fmt;

/// What a throttle did with a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The callback ran immediately, opening a cooldown window.
    Invoked,
    /// The call arrived during a cooldown window; its arguments will be replayed once the
    /// window closes unless a later call replaces them.
    Deferred,
    /// The call arrived during a cooldown window and was discarded.
    Dropped,
}

impl Admission {
    pub fn is_invoked(&self) -> bool {
        matches!(self, Admission::Invoked)
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Admission::Invoked => write!(f, "invoked"),
            Admission::Deferred => write!(f, "deferred"),
            Admission::Dropped => write!(f, "dropped"),
        }
    }
}
