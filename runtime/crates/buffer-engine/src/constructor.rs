//! The `Buffer` constructor.
//!
//! Native functions capture only Rust state (the codec table and the
//! configuration). Script values they need arrive as arguments from
//! `shims/buffer.js`: a frozen realm holding `Buffer.prototype` and the
//! `Uint8Array` constructor as they were at install time.

use std::sync::Arc;

use buffer_core::{BufferApi, BufferConfig, CodecRegistry};
use rquickjs::function::Rest;
use rquickjs::{Ctx, Function, Object, Result, Value};

use crate::host::QuickJsHost;

const BUFFER_JS: &str = include_str!("shims/buffer.js");

#[derive(Clone)]
struct Natives {
    registry: Arc<CodecRegistry>,
    config: Arc<BufferConfig>,
}

impl Natives {
    fn api<'js>(&self, host: QuickJsHost<'js>) -> BufferApi<QuickJsHost<'js>> {
        BufferApi::new(host, self.registry.clone(), self.config.clone())
    }

    fn with_realm<'js>(
        &self,
        ctx: Ctx<'js>,
        realm: &Object<'js>,
    ) -> Result<BufferApi<QuickJsHost<'js>>> {
        Ok(self.api(QuickJsHost::from_realm(ctx, realm)?))
    }
}

/// Build a fresh `Buffer` constructor in `ctx`.
pub fn create<'js>(
    ctx: &Ctx<'js>,
    registry: Arc<CodecRegistry>,
    config: &BufferConfig,
) -> Result<Object<'js>> {
    let natives = Natives {
        registry,
        config: Arc::new(config.clone()),
    };
    let native = Object::new(ctx.clone())?;
    native.set("poolSize", config.pool_size as f64)?;

    let n = natives.clone();
    native.set(
        "construct",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, realm: Object<'js>, args: Rest<Value<'js>>| -> Result<Object<'js>> {
                n.with_realm(ctx, &realm)?.construct(&args.0)
            },
        )?,
    )?;

    let n = natives.clone();
    native.set(
        "from",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, realm: Object<'js>, args: Rest<Value<'js>>| -> Result<Object<'js>> {
                n.with_realm(ctx, &realm)?.from(&args.0)
            },
        )?,
    )?;

    let n = natives.clone();
    native.set(
        "alloc",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, realm: Object<'js>, args: Rest<Value<'js>>| -> Result<Object<'js>> {
                n.with_realm(ctx, &realm)?.alloc(&args.0)
            },
        )?,
    )?;

    let n = natives.clone();
    native.set(
        "toString",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, this: Value<'js>, encoding: Value<'js>| -> Result<String> {
                n.api(QuickJsHost::new(ctx, None)).to_string(&this, Some(&encoding))
            },
        )?,
    )?;

    let n = natives;
    native.set(
        "equals",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, this: Value<'js>, other: Value<'js>| -> Result<bool> {
                n.api(QuickJsHost::new(ctx, None)).equals(&this, &other)
            },
        )?,
    )?;

    let factory: Function<'js> = ctx.eval(BUFFER_JS)?;
    factory.call((native,))
}
