//! The capability probe: transmit the query, scan for a reply on a deadline.

use std::io::{self, Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::query;
use crate::tty::{RawModeGuard, drain_input};

/// Default time budget for one probe.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default yield interval between empty reads while scanning.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Read chunk size while draining and scanning.
const READ_CHUNK: usize = 1024;

/// Outcome of one probe invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionResult {
    /// The terminal answered the graphics query.
    Supported,
    /// No recognizable reply arrived before the deadline.
    Unsupported,
}

impl DetectionResult {
    /// True for [`DetectionResult::Supported`].
    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, DetectionResult::Supported)
    }
}

/// Wall-clock deadline derived from a time budget at probe start.
///
/// A zero (or effectively negative, clamped by the caller) budget is already
/// expired: the scan loop runs zero iterations.
#[derive(Clone, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start the clock: the deadline lies `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

/// One-shot Kitty graphics probe with a fluent configuration API.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use kittycheck::Probe;
///
/// let supported = Probe::new().timeout(Duration::from_millis(500)).run();
/// ```
#[derive(Clone, Debug)]
pub struct Probe {
    timeout: Duration,
    poll_interval: Duration,
}

impl Probe {
    /// Create a probe with the default timeout and poll interval.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the total time budget for the scan.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the yield interval between empty reads.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Probe the process's own stdin/stdout.
    ///
    /// This is the probe boundary: every failure (stdin is not a terminal,
    /// attribute get/set failed, the query write failed) collapses to
    /// `false` here instead of propagating, so the host process can never be
    /// taken down — or left unrestored — by a failed probe.
    pub fn run(&self) -> bool {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout().lock();
        match self.run_on(stdin.as_fd(), &mut input, &mut output) {
            Ok(result) => {
                debug!(?result, "probe finished");
                result.is_supported()
            }
            Err(err) => {
                debug!(%err, "probe aborted");
                false
            }
        }
    }

    /// Run the probe against explicit handles.
    ///
    /// `fd` is the descriptor whose mode is switched, `input` its read side,
    /// and `output` the stream the query is written to. Splitting the three
    /// keeps the scan testable against a plain pipe. The raw-mode guard is
    /// released on every path out of this function, including `?` exits.
    pub fn run_on<R: Read, W: Write>(
        &self,
        fd: BorrowedFd<'_>,
        input: &mut R,
        output: &mut W,
    ) -> Result<DetectionResult> {
        let _guard = RawModeGuard::acquire(fd)?;

        drain_input(input);

        output.write_all(query::CAPABILITY_QUERY)?;
        output.flush()?;

        let deadline = Deadline::after(self.timeout);
        Ok(self.scan(input, &deadline))
    }

    /// Poll `input` until the response marker shows up or the deadline
    /// passes.
    ///
    /// A read that yields no data — would-block, end of stream, or any
    /// transient failure — sleeps for the poll interval before the next
    /// attempt so the loop never saturates a core. A garbled reply that
    /// never contains the marker is indistinguishable from no reply.
    fn scan<R: Read>(&self, input: &mut R, deadline: &Deadline) -> DetectionResult {
        let mut response = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        while !deadline.expired() {
            match input.read(&mut chunk) {
                Ok(n) if n > 0 => {
                    response.extend_from_slice(&chunk[..n]);
                    if query::contains_marker(&response) {
                        return DetectionResult::Supported;
                    }
                }
                Ok(_) | Err(_) => thread::sleep(self.poll_interval),
            }
        }
        DetectionResult::Unsupported
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper: probe stdin/stdout with the given time budget.
pub fn detect_kitty_graphics(timeout: Duration) -> bool {
    Probe::new().timeout(timeout).run()
}

#[cfg(test)]
mod tests {
    use std::os::fd::AsFd;
    use std::os::unix::net::UnixStream;
    use std::time::Instant;

    use super::*;
    use crate::error::ProbeError;

    const KITTY_REPLY: &[u8] = b"\x1b_Gi=31;OK\x1b\\";
    const DA_REPLY: &[u8] = b"\x1b[?62;4c";

    /// Non-blocking reader plus blocking writer, standing in for the tty.
    fn pipe_pair() -> (UnixStream, UnixStream) {
        let (reader, writer) = UnixStream::pair().unwrap();
        reader.set_nonblocking(true).unwrap();
        (reader, writer)
    }

    fn short_probe() -> Probe {
        Probe::new()
            .timeout(Duration::from_millis(80))
            .poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn deadline_zero_budget_is_already_expired() {
        assert!(Deadline::after(Duration::ZERO).expired());
    }

    #[test]
    fn deadline_future_budget_is_pending() {
        assert!(!Deadline::after(Duration::from_secs(60)).expired());
    }

    #[test]
    fn scan_finds_marker_in_single_read() {
        use std::io::Write;
        let (mut reader, mut writer) = pipe_pair();
        writer.write_all(KITTY_REPLY).unwrap();

        let probe = short_probe();
        let deadline = Deadline::after(Duration::from_millis(500));
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Supported
        );
    }

    #[test]
    fn scan_finds_marker_surrounded_by_noise() {
        use std::io::Write;
        let (mut reader, mut writer) = pipe_pair();
        writer.write_all(DA_REPLY).unwrap();
        writer.write_all(KITTY_REPLY).unwrap();
        writer.write_all(b"leftover").unwrap();

        let probe = short_probe();
        let deadline = Deadline::after(Duration::from_millis(500));
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Supported
        );
    }

    #[test]
    fn scan_finds_marker_split_across_reads() {
        use std::io::Write;
        let (mut reader, writer) = pipe_pair();
        let handle = thread::spawn(move || {
            let mut writer = writer;
            writer.write_all(&KITTY_REPLY[..4]).unwrap();
            thread::sleep(Duration::from_millis(20));
            writer.write_all(&KITTY_REPLY[4..]).unwrap();
        });

        let probe = Probe::new()
            .timeout(Duration::from_millis(500))
            .poll_interval(Duration::from_millis(5));
        let deadline = Deadline::after(Duration::from_millis(500));
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Supported
        );
        handle.join().unwrap();
    }

    #[test]
    fn scan_times_out_without_data() {
        let (mut reader, _writer) = pipe_pair();

        let probe = short_probe();
        let start = Instant::now();
        let deadline = Deadline::after(Duration::from_millis(80));
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Unsupported
        );
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn scan_rejects_reply_without_marker() {
        use std::io::Write;
        let (mut reader, mut writer) = pipe_pair();
        // A terminal that only answers device attributes.
        writer.write_all(DA_REPLY).unwrap();

        let probe = short_probe();
        let deadline = Deadline::after(Duration::from_millis(80));
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Unsupported
        );
    }

    #[test]
    fn zero_budget_means_zero_scan_iterations() {
        use std::io::Write;
        let (mut reader, mut writer) = pipe_pair();
        // Even with the reply already queued, an expired deadline wins.
        writer.write_all(KITTY_REPLY).unwrap();

        let probe = Probe::new().timeout(Duration::ZERO);
        let deadline = Deadline::after(Duration::ZERO);
        assert_eq!(
            probe.scan(&mut reader, &deadline),
            DetectionResult::Unsupported
        );
    }

    #[test]
    fn run_on_fails_fast_when_fd_is_not_a_tty() {
        let (mut reader, _writer) = pipe_pair();
        let mut sink = Vec::new();

        let probe = short_probe();
        let fd_holder = reader.as_fd().try_clone_to_owned().unwrap();
        let result = probe.run_on(fd_holder.as_fd(), &mut reader, &mut sink);
        assert!(matches!(result, Err(ProbeError::Termios(_))));
        // Nothing was transmitted before the guard failed.
        assert!(sink.is_empty());
    }

    #[test]
    fn builder_defaults() {
        let probe = Probe::default();
        assert_eq!(probe.timeout, DEFAULT_TIMEOUT);
        assert_eq!(probe.poll_interval, DEFAULT_POLL_INTERVAL);
    }
}
