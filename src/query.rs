//! Kitty graphics protocol query and response byte sequences.
//!
//! The query transmits a transient 1x1 RGB image in query-only mode
//! (`a=q,t=d,f=24`) with image id 31. A terminal that implements the
//! protocol answers with an APC reply carrying the same id; terminals that
//! do not will either swallow the sequence or echo it back, which the
//! scanner tolerates. The trailing `CSI c` (primary device attributes)
//! request serves as a secondary signal: virtually every emulator answers
//! it, so input activity without the graphics reply still resolves quickly
//! in interactive use.

/// Full capability query, sent as a single flushed write.
///
/// `ESC _ G i=31,s=1,v=1,a=q,t=d,f=24 ; AAAA ESC \` followed by `ESC [ c`.
pub const CAPABILITY_QUERY: &[u8] = b"\x1b_Gi=31,s=1,v=1,a=q,t=d,f=24;AAAA\x1b\\\x1b[c";

/// Prefix of any graphics-protocol reply to the query above.
///
/// An error reply (e.g. `ESC _ G i=31 ; ENOTSUP ...`) still starts with
/// this prefix and still proves the terminal speaks the protocol.
pub const RESPONSE_MARKER: &[u8] = b"\x1b_Gi=31;";

/// Whether the response marker occurs anywhere in `buf`.
pub fn contains_marker(buf: &[u8]) -> bool {
    buf.windows(RESPONSE_MARKER.len())
        .any(|window| window == RESPONSE_MARKER)
}
