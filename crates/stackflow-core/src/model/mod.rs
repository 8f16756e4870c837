//! Resource descriptors
//!
//! One descriptor type per resource kind. Descriptors are plain values built
//! by the caller (struct literal, `from_value`, or YAML/JSON) and validated
//! before any remote interaction. Nothing downstream mutates them.

mod flavor;
mod identity;
mod image;
mod keypair;
mod network;
mod router;
mod stack;
mod vm;
mod volume;

// Re-exports
pub use flavor::*;
pub use identity::*;
pub use image::*;
pub use keypair::*;
pub use network::*;
pub use router::*;
pub use stack::*;
pub use vm::*;
pub use volume::*;

use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;

/// Common behavior of every resource descriptor.
pub trait Descriptor: DeserializeOwned + Sized {
    /// Natural key used to look the resource up on the platform.
    fn name(&self) -> &str;

    /// Checks required fields and cross-field rules.
    fn validate(&self) -> Result<()>;

    /// Wraps a message into this kind's configuration error.
    fn invalid(message: impl Into<String>) -> ConfigError;

    /// Deserializes a loosely-typed map and validates the result.
    ///
    /// Type mismatches (e.g. `ram: "lots"`) are reported as this kind's
    /// configuration error rather than a bare JSON error.
    fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(value).map_err(|e| Self::invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn require(
    value: &str,
    field: &str,
    invalid: fn(String) -> ConfigError,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("the attribute {} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_opt(
    value: &Option<String>,
    field: &str,
    invalid: fn(String) -> ConfigError,
) -> Result<()> {
    match value {
        Some(v) => require(v, field, invalid),
        None => Err(invalid(format!("the attribute {} is required", field))),
    }
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_domain() -> String {
    "Default".to_string()
}
