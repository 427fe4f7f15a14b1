//! Error types for kittycheck.

/// Result type alias using ProbeError.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors that can occur while probing the terminal.
///
/// Every variant is fatal to the probe in flight. Callers at the probe
/// boundary convert it to a "not supported" outcome rather than letting it
/// escape to the host process.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Reading or writing terminal attributes failed, typically because the
    /// descriptor does not refer to a terminal.
    #[error("terminal attribute error: {0}")]
    Termios(#[from] nix::errno::Errno),

    /// Transmitting the capability query failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
