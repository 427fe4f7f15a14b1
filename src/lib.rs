//! # Kittycheck
//!
//! Detects whether the attached terminal understands the Kitty graphics
//! protocol, so a host application can choose between graphical and
//! text-fallback rendering before it draws anything.
//!
//! The probe flips the terminal into raw, non-blocking mode, discards any
//! stale input, transmits a graphics capability query (plus a device
//! attributes request as a secondary signal), and scans the input for a
//! protocol reply until a wall-clock deadline passes. The original terminal
//! mode is restored on every exit path — success, timeout, or failure —
//! so an interactive session is never left unusable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use kittycheck::prelude::*;
//!
//! if detect_kitty_graphics(Duration::from_millis(500)) {
//!     println!("terminal renders inline graphics");
//! } else {
//!     println!("falling back to text");
//! }
//! ```
//!
//! The `kittycheck` binary wraps the same probe behind an exit code:
//! 0 when the protocol is supported, 1 otherwise.
//!
//! ## Modules
//!
//! - [`probe`]: the probe loop, deadline, and result type
//! - [`query`]: protocol query and response byte sequences
//! - [`tty`]: raw-mode guard and input drain
//! - [`error`]: error types
//! - [`prelude`]: convenient re-exports

pub mod error;
pub mod probe;
pub mod query;
pub mod tty;

pub mod prelude;

// Re-export main types at crate root
pub use error::{ProbeError, Result};
pub use probe::{DetectionResult, Probe, detect_kitty_graphics};
