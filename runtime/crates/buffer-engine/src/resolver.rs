//! Resolver for the buffer module's specifiers.

use buffer_core::BufferConfig;
use rquickjs::loader::Resolver;
use rquickjs::{Ctx, Error, Result};

/// Maps `buffer` and its aliases (`node:buffer`) to the canonical module name.
///
/// Other specifiers fail to resolve, so this composes with another resolver
/// in a tuple: `(BufferResolver::default(), MyResolver)`.
#[derive(Debug, Clone)]
pub struct BufferResolver {
    config: BufferConfig,
}

impl BufferResolver {
    pub fn new(config: BufferConfig) -> Self {
        Self { config }
    }
}

impl Default for BufferResolver {
    fn default() -> Self {
        Self::new(crate::module_config())
    }
}

impl Resolver for BufferResolver {
    fn resolve<'js>(&mut self, _ctx: &Ctx<'js>, base: &str, name: &str) -> Result<String> {
        if self.config.is_module_name(name) {
            Ok(self.config.module_name.clone())
        } else {
            log::trace!("buffer resolver: passing on {:?} from {:?}", name, base);
            Err(Error::new_resolving(base, name))
        }
    }
}
