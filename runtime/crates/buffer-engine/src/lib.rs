//! buffer-engine
//!
//! Node.js `Buffer` for QuickJS: the global constructor, the `buffer` /
//! `node:buffer` module, and byte helpers for other native modules.
//!
//! ```ignore
//! context.with(|ctx| buffer_engine::install(&ctx))?;
//! runtime.set_loader(BufferResolver::default(), BufferLoader::default()).await;
//! ```

mod bytes;
mod constructor;
mod errors;
mod host;
mod loader;
mod module;
mod resolver;


pub use buffer_core::{BufferConfig, CodecRegistry};
pub use bytes::{bytes, decode_bytes, encode_bytes, wrap_bytes};
pub use errors::{new_range_error, new_type_error};
pub use host::QuickJsHost;
pub use loader::BufferLoader;
pub use module::{module_config, set_module_config, BufferModule};
pub use resolver::BufferResolver;

use rquickjs::{Ctx, Object, Result};

/// Install `Buffer` with the default configuration.
pub fn install(ctx: &Ctx<'_>) -> Result<()> {
    install_with(ctx, &BufferConfig::default())?;
    Ok(())
}

/// Build a `Buffer` constructor and, when `config.install_global` is set,
/// expose it as `globalThis.Buffer`.
pub fn install_with<'js>(ctx: &Ctx<'js>, config: &BufferConfig) -> Result<Object<'js>> {
    let buffer = constructor::create(ctx, CodecRegistry::standard(), config)?;
    if config.install_global {
        ctx.globals().set("Buffer", buffer.clone())?;
    }
    log::debug!(
        "buffer: installed (global: {}, poolSize: {})",
        config.install_global,
        config.pool_size
    );
    Ok(buffer)
}
