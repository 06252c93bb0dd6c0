use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "DOM_FACADE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read bridge config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How a type tag is read off a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStrategy {
    /// Compare the object's constructor against the global constructor of
    /// the same name by identity. Forged names cannot collide.
    #[default]
    Descriptor,
    /// Trust the constructor's printable name. Only sound for a closed,
    /// trusted host.
    TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub tag_strategy: TagStrategy,
    /// Read the type descriptor from `obj.node` when present (Polymer-style
    /// wrapped DOM objects).
    pub unwrap_wrapped_nodes: bool,
    /// Global whose descriptor marks the index-subscriptable collection shape.
    pub array_constructor: String,
    /// Global whose descriptor marks a token list with a writable `value`.
    pub settable_token_list: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tag_strategy: TagStrategy::Descriptor,
            unwrap_wrapped_nodes: true,
            array_constructor: String::from("Array"),
            settable_token_list: String::from("DOMSettableTokenList"),
        }
    }
}

impl BridgeConfig {
    /// Load from a YAML file. A missing path or file yields the defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                Ok(serde_yaml::from_str(&contents)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Load from the file named by `DOM_FACADE_CONFIG`, if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
    }
}
