//! Source values and the host collaborator interface.

use crate::error::BufferError;

/// What a host value looks like to the construction dispatcher.
///
/// The variants are exclusive. [`crate::BufferApi::from`] matches them in a
/// fixed order, so a given kind of script value always takes the same path.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue<V> {
    /// An `ArrayBuffer`; construction is forwarded to the host's view constructor.
    ArrayBuffer,
    /// A string primitive, already exported as UTF-8.
    String(String),
    /// A byte view (`Uint8Array`, Buffer). The bytes are an owned copy.
    ByteSequence(Vec<u8>),
    /// A number primitive.
    Number(f64),
    /// Any other object: candidate for primitive coercion or the array-like walk.
    Object(V),
    /// `undefined` or `null`.
    Absent,
    /// Booleans, symbols, bigints.
    Other,
}

/// The script engine as seen by the buffer operations.
///
/// One implementation exists per engine; tests use an in-memory one. All
/// methods are synchronous. Errors returned by the host (a throwing
/// `valueOf`, a rejected view construction) are passed through untouched.
pub trait Host {
    /// A script value handle.
    type Value: Clone;
    /// The script-visible buffer instance.
    type Instance;
    /// The engine's error type.
    type Error;

    fn classify(&self, value: &Self::Value) -> Result<SourceValue<Self::Value>, Self::Error>;

    /// Short description for error messages, e.g. `type number (5)`.
    fn describe(&self, value: &Self::Value) -> String;

    /// Construct a byte view from the forwarded arguments; the first one is an
    /// `ArrayBuffer` and the view shares its storage.
    fn view_array_buffer(&self, args: &[Self::Value]) -> Result<Self::Instance, Self::Error>;

    /// Copy of an `ArrayBuffer`'s bytes.
    fn array_buffer_bytes(&self, value: &Self::Value) -> Result<Vec<u8>, Self::Error>;

    /// Wrap owned bytes as a buffer instance.
    fn wrap_bytes(&self, bytes: Vec<u8>) -> Result<Self::Instance, Self::Error>;

    /// Call `valueOf()`. `None` when there is no such method or it returned
    /// the object itself.
    fn value_of(&self, object: &Self::Value) -> Result<Option<Self::Value>, Self::Error>;

    /// Call `[Symbol.toPrimitive](hint)`. `None` when the method is missing.
    fn to_primitive(
        &self,
        object: &Self::Value,
        hint: &str,
    ) -> Result<Option<Self::Value>, Self::Error>;

    /// The `length` property as a number, `None` when it is missing or undefined.
    fn length(&self, object: &Self::Value) -> Result<Option<f64>, Self::Error>;

    /// Element `index` as a number, `None` when it is missing or undefined.
    fn element(&self, object: &Self::Value, index: usize) -> Result<Option<f64>, Self::Error>;

    /// Script `ToNumber`.
    fn to_number(&self, value: &Self::Value) -> Result<f64, Self::Error>;

    /// Script `ToString`.
    fn to_text(&self, value: &Self::Value) -> Result<String, Self::Error>;

    /// Whether the value is `undefined` or `null`.
    fn is_absent(&self, value: &Self::Value) -> bool;

    /// Turn a buffer error into the engine's error, attaching its code.
    fn raise(&self, error: BufferError) -> Self::Error;
}
