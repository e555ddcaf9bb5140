//! Size-based allocation with optional repeating fill.

use crate::codec::CodecRegistry;
use crate::error::BufferError;

/// How to fill a freshly allocated buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill<'a> {
    /// Leave the bytes zeroed.
    Zero,
    /// Repeat the decoded text across the whole buffer.
    Text {
        text: &'a str,
        encoding: Option<&'a str>,
    },
    /// Set every byte to the value modulo 256; NaN and infinities are ignored.
    Number(f64),
}

/// Validate a script-supplied size: truncated toward zero, NaN counts as 0.
///
/// Sizes above `max_length` are `OutOfRange`, checked before anything is
/// allocated.
pub fn checked_size(size: f64, max_length: usize) -> Result<usize, BufferError> {
    if size.is_nan() {
        return Ok(0);
    }
    let size = size.trunc();
    if !size.is_finite() || size < 0.0 {
        return Err(BufferError::invalid_arg_received(
            "size",
            "a non-negative finite number",
            &format!("{}", size),
        ));
    }
    if size > max_length as f64 {
        return Err(BufferError::out_of_range("size", max_length, size));
    }
    Ok(size as usize)
}

/// `size` bytes of `byte`, or `AllocationFailed` when the allocator refuses.
pub fn filled(size: usize, byte: u8) -> Result<Vec<u8>, BufferError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size).map_err(|_| BufferError::AllocationFailed(size))?;
    buf.resize(size, byte);
    Ok(buf)
}

/// Script `ToUint8`: truncate, then wrap modulo 256. Non-finite values map to 0.
pub fn to_uint8(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(256.0) as u8
}

/// Allocate `size` bytes and apply `fill`.
pub fn allocate(size: usize, fill: Fill<'_>, registry: &CodecRegistry) -> Result<Vec<u8>, BufferError> {
    match fill {
        Fill::Zero => filled(size, 0),
        Fill::Number(value) => filled(size, to_uint8(value)),
        Fill::Text { text, encoding } => {
            let codec = registry.resolve(encoding)?;
            let mut buf = Vec::new();
            buf.try_reserve_exact(size).map_err(|_| BufferError::AllocationFailed(size))?;
            codec.decode_append(text, &mut buf);
            repeat_to(&mut buf, size);
            Ok(buf)
        }
    }
}

/// Cycle the current contents of `buf` until it is exactly `size` long.
///
/// Each round copies the already written prefix onto the tail, so the
/// pattern doubles until the last copy is cut to the remaining length.
fn repeat_to(buf: &mut Vec<u8>, size: usize) {
    if buf.len() >= size {
        buf.truncate(size);
        return;
    }
    if buf.is_empty() {
        buf.resize(size, 0);
        return;
    }
    while buf.len() < size {
        let n = buf.len().min(size - buf.len());
        buf.extend_from_within(..n);
    }
}
