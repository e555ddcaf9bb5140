//! Configuration management
//!
//! Embedders usually keep this in a `[buffer]` table of their runtime config
//! file; every field has a default so an empty document is valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Buffer module configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Value exposed as `Buffer.poolSize`. Informational only.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Also install `globalThis.Buffer`.
    #[serde(default = "default_install_global")]
    pub install_global: bool,

    /// Name the module is importable under.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Extra names resolving to the same module.
    #[serde(default = "default_module_aliases")]
    pub module_aliases: Vec<String>,

    /// How many `valueOf`/`Symbol.toPrimitive` hops `Buffer.from` follows.
    #[serde(default = "default_max_coercion_depth")]
    pub max_coercion_depth: usize,

    /// Largest buffer `alloc` and array-like `from` will create.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            install_global: default_install_global(),
            module_name: default_module_name(),
            module_aliases: default_module_aliases(),
            max_coercion_depth: default_max_coercion_depth(),
            max_length: default_max_length(),
        }
    }
}

fn default_pool_size() -> usize {
    8192
}

fn default_install_global() -> bool {
    true
}

fn default_module_name() -> String {
    "buffer".to_string()
}

fn default_module_aliases() -> Vec<String> {
    vec!["node:buffer".to_string()]
}

fn default_max_coercion_depth() -> usize {
    32
}

/// QuickJS rejects array buffers longer than `i32::MAX`.
pub const MAX_LENGTH: usize = i32::MAX as usize;

fn default_max_length() -> usize {
    MAX_LENGTH
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid buffer config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize buffer config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl BufferConfig {
    /// Load config from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Whether `name` is the module name or one of its aliases.
    pub fn is_module_name(&self, name: &str) -> bool {
        self.module_name == name || self.module_aliases.iter().any(|alias| alias == name)
    }
}
