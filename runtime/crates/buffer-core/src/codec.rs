//! String codecs and the registry that names them.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose;
use base64::Engine as _;

use crate::error::BufferError;
use crate::grow::expand;
use crate::lenient;

/// Converts between text and bytes in both directions.
pub trait StringCodec: Send + Sync {
    /// Append the bytes `text` decodes to onto `dst`.
    fn decode_append(&self, text: &str, dst: &mut Vec<u8>);

    /// Render `bytes` as text.
    fn encode(&self, bytes: &[u8]) -> String;

    /// Decode into fresh storage.
    fn decode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::new();
        self.decode_append(text, &mut out);
        out
    }
}

/// Lowercase hexadecimal.
///
/// Decoding stops at the first invalid digit or a dangling odd character and
/// keeps whatever was decoded before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hex;

impl StringCodec for Hex {
    fn decode_append(&self, text: &str, dst: &mut Vec<u8>) {
        let start = dst.len();
        let region = expand(dst, text.len() / 2);
        let mut written = 0;
        for (slot, pair) in region.iter_mut().zip(text.as_bytes().chunks_exact(2)) {
            match (hex_digit(pair[0]), hex_digit(pair[1])) {
                (Some(hi), Some(lo)) => {
                    *slot = hi << 4 | lo;
                    written += 1;
                }
                _ => break,
            }
        }
        if written * 2 != text.len() {
            log::trace!("hex: kept {} of {} input characters", written * 2, text.len());
        }
        dst.truncate(start + written);
    }

    fn encode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            let _ = write!(out, "{:02x}", byte);
        }
        out
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// UTF-8. Lossy when rendering bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl StringCodec for Utf8 {
    fn decode_append(&self, text: &str, dst: &mut Vec<u8>) {
        expand(dst, text.len()).copy_from_slice(text.as_bytes());
    }

    fn encode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Standard base64: lenient decode, padded encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64;

impl StringCodec for Base64 {
    fn decode_append(&self, text: &str, dst: &mut Vec<u8>) {
        lenient::decode_append(text, dst);
    }

    fn encode(&self, bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(bytes)
    }
}

/// URL-safe base64: lenient decode, unpadded `-`/`_` encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Url;

impl StringCodec for Base64Url {
    fn decode_append(&self, text: &str, dst: &mut Vec<u8>) {
        lenient::decode_append(text, dst);
    }

    fn encode(&self, bytes: &[u8]) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

static STANDARD: OnceLock<Arc<CodecRegistry>> = OnceLock::new();

/// Immutable name → codec table.
///
/// Lookups are exact and case-sensitive. The standard table is built once per
/// process and shared by every runtime; custom tables come from
/// [`CodecRegistry::builder`].
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn StringCodec>>,
}

impl CodecRegistry {
    /// `hex`, `utf8`, `utf-8`, `base64` and `base64Url`.
    pub fn standard() -> Arc<CodecRegistry> {
        STANDARD
            .get_or_init(|| {
                let utf8: Arc<dyn StringCodec> = Arc::new(Utf8);
                Arc::new(
                    CodecRegistry::builder()
                        .register("hex", Hex)
                        .register_shared("utf8", utf8.clone())
                        .register_shared("utf-8", utf8)
                        .register("base64", Base64)
                        .register("base64Url", Base64Url)
                        .build(),
                )
            })
            .clone()
    }

    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&dyn StringCodec> {
        self.codecs.get(name).map(|codec| codec.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a name that the caller supplied explicitly.
    pub fn lookup(&self, name: &str) -> Result<&dyn StringCodec, BufferError> {
        self.get(name)
            .ok_or_else(|| BufferError::UnknownEncoding(name.to_string()))
    }

    /// Look up an optional encoding; an absent one means UTF-8.
    pub fn resolve(&self, name: Option<&str>) -> Result<&dyn StringCodec, BufferError> {
        match name {
            Some(name) => self.lookup(name),
            None => Ok(self.get("utf8").unwrap_or(&Utf8)),
        }
    }

    pub fn decode(&self, text: &str, encoding: Option<&str>) -> Result<Vec<u8>, BufferError> {
        Ok(self.resolve(encoding)?.decode(text))
    }

    pub fn encode(&self, bytes: &[u8], encoding: Option<&str>) -> Result<String, BufferError> {
        Ok(self.resolve(encoding)?.encode(bytes))
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.names())
            .finish()
    }
}

/// Collects codecs before freezing them into a [`CodecRegistry`].
#[derive(Default)]
pub struct CodecRegistryBuilder {
    codecs: HashMap<String, Arc<dyn StringCodec>>,
}

impl CodecRegistryBuilder {
    pub fn register(self, name: impl Into<String>, codec: impl StringCodec + 'static) -> Self {
        self.register_shared(name, Arc::new(codec))
    }

    /// Register one codec instance under several names.
    pub fn register_shared(mut self, name: impl Into<String>, codec: Arc<dyn StringCodec>) -> Self {
        self.codecs.insert(name.into(), codec);
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            codecs: self.codecs,
        }
    }
}
