//! Buffer error taxonomy.
//!
//! Every variant maps to a Node.js error code; engines surface them as
//! `TypeError`s carrying that code.

use thiserror::Error;

pub const ERR_INVALID_ARG_TYPE: &str = "ERR_INVALID_ARG_TYPE";
pub const ERR_UNKNOWN_ENCODING: &str = "ERR_UNKNOWN_ENCODING";
pub const ERR_METHOD_NOT_IMPLEMENTED: &str = "ERR_METHOD_NOT_IMPLEMENTED";
pub const ERR_OUT_OF_RANGE: &str = "ERR_OUT_OF_RANGE";
pub const ERR_MEMORY_ALLOCATION_FAILED: &str = "ERR_MEMORY_ALLOCATION_FAILED";

/// Failure raised by a buffer operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The argument's shape matches none of the accepted kinds.
    #[error("{0}")]
    InvalidArgType(String),
    /// An explicitly named encoding is not registered.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
    /// The operation exists in Node.js but is deliberately unsupported here.
    #[error("{0}")]
    NotImplemented(String),
    /// A size or length beyond the configured maximum buffer length.
    #[error("{0}")]
    OutOfRange(String),
    /// The allocator could not provide the requested bytes.
    #[error("Array buffer allocation failed for {0} bytes")]
    AllocationFailed(usize),
}

impl BufferError {
    /// Machine-readable Node.js error code.
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::InvalidArgType(_) => ERR_INVALID_ARG_TYPE,
            BufferError::UnknownEncoding(_) => ERR_UNKNOWN_ENCODING,
            BufferError::NotImplemented(_) => ERR_METHOD_NOT_IMPLEMENTED,
            BufferError::OutOfRange(_) => ERR_OUT_OF_RANGE,
            BufferError::AllocationFailed(_) => ERR_MEMORY_ALLOCATION_FAILED,
        }
    }

    /// Name of the script-visible error constructor.
    pub fn name(&self) -> &'static str {
        match self {
            BufferError::OutOfRange(_) | BufferError::AllocationFailed(_) => "RangeError",
            _ => "TypeError",
        }
    }

    /// `The "<argument>" argument must be <expected>.`
    pub fn invalid_arg(argument: &str, expected: &str) -> Self {
        BufferError::InvalidArgType(format!(
            "The \"{}\" argument must be {}.",
            argument, expected
        ))
    }

    /// Same as [`BufferError::invalid_arg`] with a description of what arrived.
    pub fn invalid_arg_received(argument: &str, expected: &str, received: &str) -> Self {
        BufferError::InvalidArgType(format!(
            "The \"{}\" argument must be {}. Received {}",
            argument, expected, received
        ))
    }

    /// `The value of "<name>" is out of range. It must be <= <max>. Received <value>`
    pub fn out_of_range(name: &str, max: usize, received: f64) -> Self {
        BufferError::OutOfRange(format!(
            "The value of \"{}\" is out of range. It must be >= 0 && <= {}. Received {}",
            name, max, received
        ))
    }
}

/// Render an error the way Node.js prints coded errors: `TypeError [CODE]: message`.
///
/// Empty parts are left out, so an error without a message renders as
/// `TypeError [CODE]` and one without a name falls back to `Error`.
pub fn format_error(name: Option<&str>, code: Option<&str>, message: Option<&str>) -> String {
    let mut out = String::from(name.unwrap_or("Error"));
    if let Some(code) = code {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push('[');
        out.push_str(code);
        out.push(']');
    }
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(message);
    }
    out
}
