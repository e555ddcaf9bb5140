//! buffer-core
//!
//! Node.js-compatible `Buffer` semantics without a script engine attached:
//! string codecs, type-directed construction, allocation with fill, and the
//! `toString`/`equals` instance operations.
//!
//! The engine side is reached only through the [`Host`] trait, so the same
//! dispatcher drives the QuickJS binding and the in-memory hosts used in tests.

pub mod alloc;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod grow;
pub mod instance;
pub mod lenient;
pub mod source;

pub use alloc::{allocate, Fill};
pub use codec::{Base64, Base64Url, CodecRegistry, CodecRegistryBuilder, Hex, StringCodec, Utf8};
pub use config::{BufferConfig, ConfigError};
pub use dispatch::{BufferApi, Encoded};
pub use error::{format_error, BufferError};
pub use source::{Host, SourceValue};
