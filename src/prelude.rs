//! Convenient re-exports for common usage.
//!
//! ```rust
//! use kittycheck::prelude::*;
//! ```

pub use crate::error::{ProbeError, Result};
pub use crate::probe::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, Deadline, DetectionResult, Probe,
    detect_kitty_graphics,
};
pub use crate::query::{CAPABILITY_QUERY, RESPONSE_MARKER};
pub use crate::tty::RawModeGuard;
