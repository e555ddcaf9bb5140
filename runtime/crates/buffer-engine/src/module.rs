//! `import { Buffer } from "buffer"`.

use std::cell::RefCell;

use buffer_core::BufferConfig;
use rquickjs::module::{Declarations, Exports, ModuleDef};
use rquickjs::{Ctx, Object, Result, Value};

// Module declarations are stateless, so the configuration lives per thread.
thread_local! {
    static MODULE_CONFIG: RefCell<BufferConfig> = RefCell::new(BufferConfig::default());
}

/// Set the configuration used when the module is first evaluated on this thread.
pub fn set_module_config(config: BufferConfig) {
    MODULE_CONFIG.with(|c| {
        *c.borrow_mut() = config;
    });
}

pub fn module_config() -> BufferConfig {
    MODULE_CONFIG.with(|c| c.borrow().clone())
}

/// Native module exporting `Buffer` and a default namespace object.
pub struct BufferModule;

impl ModuleDef for BufferModule {
    fn declare(declare: &Declarations) -> Result<()> {
        declare.declare("Buffer")?;
        declare.declare("default")?;
        Ok(())
    }

    fn evaluate<'js>(ctx: &Ctx<'js>, exports: &Exports<'js>) -> Result<()> {
        let buffer = shared_constructor(ctx)?;
        let namespace = Object::new(ctx.clone())?;
        namespace.set("Buffer", buffer.clone())?;
        exports.export("Buffer", buffer)?;
        exports.export("default", namespace)?;
        Ok(())
    }
}

/// The installed global `Buffer` when there is one, so `instanceof` agrees
/// between module and global code; otherwise a fresh constructor.
fn shared_constructor<'js>(ctx: &Ctx<'js>) -> Result<Object<'js>> {
    let global: Value<'js> = ctx.globals().get("Buffer")?;
    if let Some(buffer) = global.as_object() {
        log::debug!("buffer module: exporting the global Buffer");
        return Ok(buffer.clone());
    }
    crate::install_with(ctx, &module_config())
}
