//! Coded `TypeError`s and `RangeError`s.
//!
//! Node.js code switches on `err.code`, so every error raised by the buffer
//! module carries one, and its `toString()` renders `TypeError [CODE]: message`.
//! The error objects come from the engine's own constructors, never from
//! `globalThis`, so scripts cannot swap them out.

use buffer_core::{format_error, BufferError};
use rquickjs::function::This;
use rquickjs::{Ctx, Error, Exception, FromJs, Function, Object, Result};

/// Build a `TypeError` with `code` attached.
pub fn new_type_error<'js>(ctx: &Ctx<'js>, code: &str, message: &str) -> Result<Object<'js>> {
    new_error(ctx, "TypeError", code, message)
}

/// Build a `RangeError` with `code` attached.
pub fn new_range_error<'js>(ctx: &Ctx<'js>, code: &str, message: &str) -> Result<Object<'js>> {
    new_error(ctx, "RangeError", code, message)
}

fn new_error<'js>(ctx: &Ctx<'js>, name: &str, code: &str, message: &str) -> Result<Object<'js>> {
    // The engine only hands out its intrinsic errors by throwing them.
    let _ = match name {
        "RangeError" => Exception::throw_range(ctx, message),
        _ => Exception::throw_type(ctx, message),
    };
    let error = Object::from_js(ctx, ctx.catch())?;
    decorate(ctx, &error, code)?;
    Ok(error)
}

/// Attach `code` and the coded `toString` to an existing error object.
pub fn decorate<'js>(ctx: &Ctx<'js>, error: &Object<'js>, code: &str) -> Result<()> {
    error.set("code", code)?;
    let to_string = Function::new(ctx.clone(), |this: This<Object<'js>>| -> Result<String> {
        let name: Option<String> = this.0.get("name")?;
        let code: Option<String> = this.0.get("code")?;
        let message: Option<String> = this.0.get("message")?;
        Ok(format_error(
            name.as_deref(),
            code.as_deref(),
            message.as_deref(),
        ))
    })?;
    error.set("toString", to_string)?;
    Ok(())
}

/// Throw `error` into the context and return the marker to propagate with `?`.
pub fn throw(ctx: &Ctx<'_>, error: BufferError) -> Error {
    log::debug!("buffer: throwing {}: {}", error.code(), error);
    match new_error(ctx, error.name(), error.code(), &error.to_string()) {
        Ok(object) => ctx.throw(object.into_value()),
        Err(err) => err,
    }
}
