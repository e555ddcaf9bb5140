//! Amortized append for byte storage.

/// Claim `additional` bytes at the end of `buf` and return them for writing.
///
/// Spare capacity is reused in place. Otherwise the storage grows to exactly
/// `buf.len() + additional` and the existing prefix is carried over.
///
/// The contents of the returned region are unspecified. Callers that write
/// fewer bytes than they claimed must `truncate` back to what they wrote.
pub fn expand(buf: &mut Vec<u8>, additional: usize) -> &mut [u8] {
    let start = buf.len();
    if buf.capacity() - start < additional {
        buf.reserve_exact(additional);
    }
    buf.resize(start + additional, 0);
    &mut buf[start..]
}
