//! Byte helpers for other native modules.
//!
//! Modules that accept `string | Buffer | ArrayBuffer` arguments or hand bytes
//! back to script use these instead of touching typed arrays directly.

use buffer_core::{BufferApi, CodecRegistry, Encoded};
use rquickjs::{Ctx, FromJs, IntoJs, Object, Result, TypedArray, Value};

use crate::host::QuickJsHost;
use crate::module::module_config;

// How far up the global `Buffer.prototype` chain to look for `Uint8Array.prototype`.
const MAX_PROTOTYPE_DEPTH: usize = 8;

fn api<'js>(ctx: &Ctx<'js>) -> Result<BufferApi<QuickJsHost<'js>>> {
    Ok(BufferApi::new(
        QuickJsHost::new(ctx.clone(), buffer_prototype(ctx)?),
        CodecRegistry::standard(),
        module_config(),
    ))
}

/// `globalThis.Buffer.prototype`, if it descends from the engine's own
/// `Uint8Array.prototype`. Anything else yields plain `Uint8Array`s.
fn buffer_prototype<'js>(ctx: &Ctx<'js>) -> Result<Option<Object<'js>>> {
    let global: Value<'js> = ctx.globals().get("Buffer")?;
    let Some(buffer) = global.as_object() else {
        return Ok(None);
    };
    let Some(candidate) = buffer.get::<_, Value<'js>>("prototype")?.as_object().cloned() else {
        return Ok(None);
    };

    let empty = TypedArray::<u8>::new(ctx.clone(), Vec::new())?;
    let Some(intrinsic) = Object::from_js(ctx, empty.into_js(ctx)?)?.get_prototype() else {
        return Ok(None);
    };

    let mut current = candidate.get_prototype();
    for _ in 0..MAX_PROTOTYPE_DEPTH {
        match current {
            Some(proto) if *proto.as_value() == *intrinsic.as_value() => {
                return Ok(Some(candidate));
            }
            Some(proto) => current = proto.get_prototype(),
            None => break,
        }
    }
    log::debug!("buffer: global Buffer.prototype is not a Uint8Array prototype");
    Ok(None)
}

/// Bytes of a byte view, or the UTF-8 bytes of any other value's string form.
pub fn bytes<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> Result<Vec<u8>> {
    api(ctx)?.bytes(value)
}

/// Bytes of a `data` argument: a string decoded with `encoding`, an
/// `ArrayBuffer`, or a byte view. Anything else throws `ERR_INVALID_ARG_TYPE`.
pub fn decode_bytes<'js>(
    ctx: &Ctx<'js>,
    data: &Value<'js>,
    encoding: Option<&Value<'js>>,
) -> Result<Vec<u8>> {
    api(ctx)?.decode_bytes(data, encoding)
}

/// Text when `encoding` names a codec, a `Buffer` otherwise.
pub fn encode_bytes<'js>(
    ctx: &Ctx<'js>,
    data: Vec<u8>,
    encoding: Option<&Value<'js>>,
) -> Result<Value<'js>> {
    match api(ctx)?.encode_bytes(data, encoding)? {
        Encoded::Text(text) => text.into_js(ctx),
        Encoded::Buffer(buffer) => Ok(buffer.into_value()),
    }
}

/// Wrap owned bytes as a `Buffer` (a plain `Uint8Array` before install).
pub fn wrap_bytes<'js>(ctx: &Ctx<'js>, data: Vec<u8>) -> Result<Object<'js>> {
    api(ctx)?.wrap_bytes(data)
}
