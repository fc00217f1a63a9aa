//! # Service Layer
//!
//! The reactor applies one log; the listener feeds it; the backoff paces
//! the listener's retries.

pub mod backoff;
pub mod listener;
pub mod reactor;

pub use backoff::Backoff;
pub use listener::{EventListener, ResumePoint};
pub use reactor::{EventReactor, LogOutcome};
