//! Type-directed construction and the per-runtime buffer API.

use std::sync::Arc;

use crate::alloc::{self, Fill};
use crate::codec::CodecRegistry;
use crate::config::BufferConfig;
use crate::error::BufferError;
use crate::instance;
use crate::source::{Host, SourceValue};

const FROM_EXPECTED: &str = "of type string or an instance of Buffer, ArrayBuffer, or Array or an Array-like Object";

/// Result of [`BufferApi::encode_bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded<I> {
    Text(String),
    Buffer(I),
}

/// Buffer operations bound to one host runtime.
///
/// Holds the shared codec table and the configuration; every operation takes
/// its arguments as host values and returns host instances or host errors.
pub struct BufferApi<H: Host> {
    host: H,
    registry: Arc<CodecRegistry>,
    config: Arc<BufferConfig>,
}

impl<H: Host> BufferApi<H> {
    pub fn new(
        host: H,
        registry: Arc<CodecRegistry>,
        config: impl Into<Arc<BufferConfig>>,
    ) -> Self {
        Self {
            host,
            registry,
            config: config.into(),
        }
    }

    /// Standard codecs, default configuration.
    pub fn with_defaults(host: H) -> Self {
        Self::new(host, CodecRegistry::standard(), BufferConfig::default())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// `new Buffer(...)` / `Buffer(...)`.
    ///
    /// Sizing by number belongs to `Buffer.alloc`; everything else behaves
    /// like [`BufferApi::from`].
    pub fn construct(&self, args: &[H::Value]) -> Result<H::Instance, H::Error> {
        if let Some(first) = args.first() {
            if let SourceValue::Number(_) = self.host.classify(first)? {
                return Err(self.host.raise(BufferError::NotImplemented(
                    "Calling the Buffer constructor with numeric argument is not implemented yet"
                        .to_string(),
                )));
            }
        }
        self.from(args)
    }

    /// `Buffer.from(source, encodingOrOffset?, length?)`.
    pub fn from(&self, args: &[H::Value]) -> Result<H::Instance, H::Error> {
        let mut args = args.to_vec();
        self.dispatch(&mut args, 0)
    }

    fn dispatch(&self, args: &mut [H::Value], depth: usize) -> Result<H::Instance, H::Error> {
        let Some(first) = args.first().cloned() else {
            return Err(self.invalid_source("undefined".to_string()));
        };

        match self.host.classify(&first)? {
            SourceValue::ArrayBuffer => {
                log::trace!("Buffer.from: viewing ArrayBuffer");
                self.host.view_array_buffer(args)
            }
            SourceValue::String(text) => {
                let encoding = self.encoding_arg(args.get(1))?;
                let bytes = self
                    .registry
                    .decode(&text, encoding.as_deref())
                    .map_err(|e| self.host.raise(e))?;
                self.host.wrap_bytes(bytes)
            }
            SourceValue::ByteSequence(bytes) => self.host.wrap_bytes(bytes),
            SourceValue::Object(object) => {
                if depth >= self.config.max_coercion_depth {
                    log::debug!("Buffer.from: gave up after {} coercions", depth);
                    return Err(self.invalid_source(self.host.describe(&first)));
                }
                if let Some(primitive) = self.host.value_of(&object)? {
                    args[0] = primitive;
                    return self.dispatch(args, depth + 1);
                }
                if let Some(primitive) = self.host.to_primitive(&object, "string")? {
                    args[0] = primitive;
                    return self.dispatch(args, depth + 1);
                }
                match self.host.length(&object)? {
                    Some(length) => {
                        let bytes = self.collect_array_like(&object, length)?;
                        self.host.wrap_bytes(bytes)
                    }
                    None => Err(self.invalid_source(self.host.describe(&first))),
                }
            }
            SourceValue::Number(_) | SourceValue::Absent | SourceValue::Other => {
                Err(self.invalid_source(self.host.describe(&first)))
            }
        }
    }

    fn collect_array_like(&self, object: &H::Value, length: f64) -> Result<Vec<u8>, H::Error> {
        let length =
            array_length(length, self.config.max_length).map_err(|e| self.host.raise(e))?;
        let mut bytes = alloc::filled(length, 0).map_err(|e| self.host.raise(e))?;
        for (index, slot) in bytes.iter_mut().enumerate() {
            if let Some(value) = self.host.element(object, index)? {
                *slot = alloc::to_uint8(value);
            }
        }
        Ok(bytes)
    }

    fn invalid_source(&self, received: String) -> H::Error {
        self.host.raise(BufferError::InvalidArgType(format!(
            "The first argument must be {}. Received {}",
            FROM_EXPECTED, received
        )))
    }

    /// `Buffer.alloc(size, fill?, encoding?)`.
    pub fn alloc(&self, args: &[H::Value]) -> Result<H::Instance, H::Error> {
        let size = match args.first() {
            Some(value) => match self.host.classify(value)? {
                SourceValue::Number(size) => size,
                _ => {
                    return Err(self.host.raise(BufferError::invalid_arg_received(
                        "size",
                        "of type number",
                        &self.host.describe(value),
                    )))
                }
            },
            None => {
                return Err(self.host.raise(BufferError::invalid_arg_received(
                    "size",
                    "of type number",
                    "undefined",
                )))
            }
        };
        let size =
            alloc::checked_size(size, self.config.max_length).map_err(|e| self.host.raise(e))?;

        let text;
        let encoding;
        let fill = match args.get(1) {
            None => Fill::Zero,
            Some(value) if self.host.is_absent(value) => Fill::Zero,
            Some(value) => match self.host.classify(value)? {
                SourceValue::String(s) => {
                    text = s;
                    encoding = self.fill_encoding_arg(args.get(2))?;
                    Fill::Text {
                        text: &text,
                        encoding: encoding.as_deref(),
                    }
                }
                _ => Fill::Number(self.host.to_number(value)?),
            },
        };

        let bytes = alloc::allocate(size, fill, &self.registry).map_err(|e| self.host.raise(e))?;
        self.host.wrap_bytes(bytes)
    }

    /// `buf.toString(encoding?)`.
    ///
    /// A receiver that is not a byte view contributes the UTF-8 bytes of its
    /// string form.
    pub fn to_string(
        &self,
        this: &H::Value,
        encoding: Option<&H::Value>,
    ) -> Result<String, H::Error> {
        let bytes = self.bytes(this)?;
        let encoding = self.encoding_arg(encoding)?;
        instance::to_string(&bytes, encoding.as_deref(), &self.registry)
            .map_err(|e| self.host.raise(e))
    }

    /// `buf.equals(otherBuffer)`.
    pub fn equals(&self, this: &H::Value, other: &H::Value) -> Result<bool, H::Error> {
        let SourceValue::ByteSequence(other) = self.host.classify(other)? else {
            return Err(self.host.raise(BufferError::invalid_arg_received(
                "otherBuffer",
                "an instance of Buffer or Uint8Array",
                &self.host.describe(other),
            )));
        };
        let bytes = self.bytes(this)?;
        Ok(instance::equals(&bytes, &other))
    }

    /// Bytes of a byte view, or the UTF-8 bytes of the value's string form.
    pub fn bytes(&self, value: &H::Value) -> Result<Vec<u8>, H::Error> {
        match self.host.classify(value)? {
            SourceValue::ByteSequence(bytes) => Ok(bytes),
            SourceValue::String(text) => Ok(text.into_bytes()),
            _ => Ok(self.host.to_text(value)?.into_bytes()),
        }
    }

    /// Raw bytes of a `data` argument: a string (decoded), an `ArrayBuffer`
    /// or a byte view.
    pub fn decode_bytes(
        &self,
        data: &H::Value,
        encoding: Option<&H::Value>,
    ) -> Result<Vec<u8>, H::Error> {
        match self.host.classify(data)? {
            SourceValue::ArrayBuffer => self.host.array_buffer_bytes(data),
            SourceValue::String(text) => {
                let encoding = self.encoding_arg(encoding)?;
                self.registry
                    .decode(&text, encoding.as_deref())
                    .map_err(|e| self.host.raise(e))
            }
            SourceValue::ByteSequence(bytes) => Ok(bytes),
            _ => Err(self.host.raise(BufferError::invalid_arg_received(
                "data",
                "of type string or an instance of Buffer, TypedArray, or DataView",
                &self.host.describe(data),
            ))),
        }
    }

    /// Encode `bytes` as text when `encoding` names a codec, otherwise wrap
    /// them as a buffer.
    pub fn encode_bytes(
        &self,
        bytes: Vec<u8>,
        encoding: Option<&H::Value>,
    ) -> Result<Encoded<H::Instance>, H::Error> {
        if let Some(name) = self.encoding_arg(encoding)? {
            if let Some(codec) = self.registry.get(&name) {
                return Ok(Encoded::Text(codec.encode(&bytes)));
            }
            log::debug!("encode_bytes: unknown encoding {:?}, returning a Buffer", name);
        }
        self.host.wrap_bytes(bytes).map(Encoded::Buffer)
    }

    /// Wrap owned bytes as a buffer instance.
    pub fn wrap_bytes(&self, bytes: Vec<u8>) -> Result<H::Instance, H::Error> {
        self.host.wrap_bytes(bytes)
    }

    /// The fill encoding of `alloc`: used only when it is a string, anything
    /// else means utf8.
    fn fill_encoding_arg(&self, value: Option<&H::Value>) -> Result<Option<String>, H::Error> {
        match value {
            Some(value) => match self.host.classify(value)? {
                SourceValue::String(name) => Ok(Some(name)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// An encoding argument: absent (`undefined`/`null`) or its string form.
    fn encoding_arg(&self, value: Option<&H::Value>) -> Result<Option<String>, H::Error> {
        match value {
            Some(value) if !self.host.is_absent(value) => match self.host.classify(value)? {
                SourceValue::String(name) => Ok(Some(name)),
                _ => Ok(Some(self.host.to_text(value)?)),
            },
            _ => Ok(None),
        }
    }
}

/// Length of an array-like source. NaN and negative lengths are empty;
/// lengths above `max_length` are rejected before any element is read.
fn array_length(length: f64, max_length: usize) -> Result<usize, BufferError> {
    if length.is_nan() || length <= 0.0 {
        return Ok(0);
    }
    if !length.is_finite() {
        return Err(BufferError::InvalidArgType(format!(
            "The \"length\" property must be a finite number. Received {}",
            length
        )));
    }
    let length = length.trunc();
    if length > max_length as f64 {
        return Err(BufferError::out_of_range("length", max_length, length));
    }
    Ok(length as usize)
}
