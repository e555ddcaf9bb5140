//! `Buffer.prototype.toString` and `Buffer.prototype.equals`.

use crate::codec::CodecRegistry;
use crate::error::BufferError;

pub fn to_string(
    bytes: &[u8],
    encoding: Option<&str>,
    registry: &CodecRegistry,
) -> Result<String, BufferError> {
    registry.encode(bytes, encoding)
}

/// Exact comparison: same length and same bytes.
pub fn equals(left: &[u8], right: &[u8]) -> bool {
    left == right
}
