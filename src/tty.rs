//! Raw-mode acquisition and restoration for the probed terminal.

use std::io::{self, Read};
use std::os::fd::BorrowedFd;

use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::sys::termios::{
    LocalFlags, SetArg, SpecialCharacterIndices, Termios, tcgetattr, tcsetattr,
};
use tracing::{trace, warn};

use crate::error::Result;

/// RAII guard that holds the probed descriptor in raw, non-blocking mode.
///
/// [`acquire`](RawModeGuard::acquire) snapshots the current termios and file
/// status flags, then disables canonical mode, echo, and signal generation
/// (VMIN=1, VTIME=0 so single bytes are delivered immediately) and sets
/// `O_NONBLOCK` on the descriptor.
///
/// The `Drop` impl restores both snapshots exactly once, on every exit path
/// out of the probe: normal return, timeout, or error unwinding through `?`.
/// Termios is re-applied with `TCSADRAIN` so pending output (the query bytes)
/// is written out before the line discipline flips back.
///
/// While a guard is alive no other code may reconfigure the descriptor.
pub struct RawModeGuard<'fd> {
    fd: BorrowedFd<'fd>,
    saved_termios: Termios,
    saved_flags: OFlag,
}

impl<'fd> RawModeGuard<'fd> {
    /// Switch `fd` into raw non-blocking mode, capturing its prior state.
    ///
    /// Fails with a termios error when `fd` is not an interactive terminal
    /// (e.g. stdin redirected from a file). If the switch fails partway, the
    /// already-applied termios change is rolled back before returning.
    pub fn acquire(fd: BorrowedFd<'fd>) -> Result<Self> {
        let saved_termios = tcgetattr(fd)?;

        let mut raw = saved_termios.clone();
        raw.local_flags &= !(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        tcsetattr(fd, SetArg::TCSANOW, &raw)?;

        match Self::set_nonblocking(fd) {
            Ok(saved_flags) => Ok(Self {
                fd,
                saved_termios,
                saved_flags,
            }),
            Err(err) => {
                // Roll back the termios change; the guard never existed.
                let _ = tcsetattr(fd, SetArg::TCSADRAIN, &saved_termios);
                Err(err.into())
            }
        }
    }

    /// Set `O_NONBLOCK`, returning the previous file status flags.
    fn set_nonblocking(fd: BorrowedFd<'_>) -> nix::Result<OFlag> {
        let saved = OFlag::from_bits_retain(fcntl(fd, FcntlArg::F_GETFL)?);
        fcntl(fd, FcntlArg::F_SETFL(saved | OFlag::O_NONBLOCK))?;
        Ok(saved)
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        // Restoration failure cannot override an already-computed probe
        // result; log it and move on.
        if let Err(err) = tcsetattr(self.fd, SetArg::TCSADRAIN, &self.saved_termios) {
            warn!(%err, "failed to restore terminal attributes");
        }
        if let Err(err) = fcntl(self.fd, FcntlArg::F_SETFL(self.saved_flags)) {
            warn!(%err, "failed to restore file status flags");
        }
    }
}

/// Discard everything currently queued on `input`.
///
/// Runs once after entering raw mode and before the query is transmitted, so
/// stale bytes (leftover keystrokes) cannot be mistaken for part of the
/// response. Loops until a read yields no data or would block; read errors
/// here are non-fatal.
pub fn drain_input<R: Read>(input: &mut R) {
    let mut buf = [0u8; 1024];
    let mut discarded = 0usize;
    loop {
        match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    if discarded > 0 {
        trace!(discarded, "drained stale input before probe");
    }
}
