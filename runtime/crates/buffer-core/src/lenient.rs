//! Lenient base64 decoding.
//!
//! Scripts hand us base64 from all kinds of places (data URLs, PEM bodies,
//! JWT segments), so decoding never fails: whitespace is skipped, padding is
//! optional, both the standard and URL-safe alphabets are accepted, and
//! anything after the first `=` or invalid character is ignored.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::grow::expand;

/// Standard alphabet, padding optional, non-zero trailing bits accepted.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Append the bytes decoded from `text` to `dst` and return how many were added.
pub fn decode_append(text: &str, dst: &mut Vec<u8>) -> usize {
    let mut symbols = normalize(text);
    // A lone trailing sextet cannot complete a byte.
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }

    let start = dst.len();
    let region = expand(dst, ::base64::decoded_len_estimate(symbols.len()));
    let written = match LENIENT.decode_slice(&symbols, region) {
        Ok(n) => n,
        Err(err) => {
            log::debug!("base64: dropping undecodable input: {}", err);
            0
        }
    };
    dst.truncate(start + written);
    written
}

/// Collect the valid prefix as standard-alphabet symbols.
fn normalize(text: &str) -> Vec<u8> {
    let mut symbols = Vec::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => symbols.push(byte),
            b'-' => symbols.push(b'+'),
            b'_' => symbols.push(b'/'),
            b if b.is_ascii_whitespace() => {}
            _ => break,
        }
    }
    symbols
}
