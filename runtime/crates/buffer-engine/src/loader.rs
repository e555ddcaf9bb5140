//! Loader declaring the native buffer module.

use rquickjs::loader::Loader;
use rquickjs::module::Declared;
use rquickjs::{Ctx, Error, Module, Result};

use crate::module::BufferModule;

/// Declares [`BufferModule`] for the canonical module name.
#[derive(Debug, Clone)]
pub struct BufferLoader {
    module_name: String,
}

impl BufferLoader {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }
}

impl Default for BufferLoader {
    fn default() -> Self {
        Self::new(crate::module_config().module_name)
    }
}

impl Loader for BufferLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, path: &str) -> Result<Module<'js, Declared>> {
        if path != self.module_name {
            return Err(Error::new_loading(path));
        }
        Module::declare_def::<BufferModule, _>(ctx.clone(), path)
    }
}
