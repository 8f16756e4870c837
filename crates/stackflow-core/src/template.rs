//! Declarative template loading
//!
//! Templates arrive either as an in-memory document or as a file. A
//! document whose first non-whitespace character is `{` is parsed as JSON,
//! anything else as YAML. A valid template carries one of the recognized
//! version markers.

use crate::error::{ConfigError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Keys that identify a document as an orchestration template
pub const VERSION_KEYS: [&str; 3] = [
    "heat_template_version",
    "HeatTemplateFormatVersion",
    "AWSTemplateFormatVersion",
];

/// Resource declared in a template's `resources` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateResource {
    pub name: String,
    pub resource_type: String,
}

/// Parsed and version-checked template document
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    body: Value,
}

impl Template {
    /// Parses template text (JSON or YAML).
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_value(parse_document(text)?)
    }

    /// Reads and parses a template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let template = Self::parse(&text)?;
        debug!(
            path = %path.display(),
            resources = template.resources().len(),
            "Loaded template file"
        );
        Ok(template)
    }

    pub fn from_value(body: Value) -> Result<Self> {
        Self::check_version(&body)?;
        Ok(Self { body })
    }

    /// Ensures the document is a mapping holding a version marker.
    pub fn check_version(body: &Value) -> Result<()> {
        let map = body.as_object().ok_or_else(|| {
            ConfigError::Template("template must be a mapping".to_string())
        })?;
        if VERSION_KEYS.iter().any(|key| map.contains_key(*key)) {
            Ok(())
        } else {
            Err(ConfigError::Template(format!(
                "none of {} found",
                VERSION_KEYS.join(", ")
            )))
        }
    }

    pub fn version(&self) -> Option<String> {
        VERSION_KEYS.iter().find_map(|key| {
            self.body.get(*key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
    }

    pub fn resources(&self) -> Vec<TemplateResource> {
        let Some(resources) = self.body.get("resources").and_then(Value::as_object) else {
            return Vec::new();
        };
        resources
            .iter()
            .map(|(name, def)| TemplateResource {
                name: name.clone(),
                resource_type: def
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        section_keys(&self.body, "parameters")
    }

    pub fn output_names(&self) -> Vec<String> {
        section_keys(&self.body, "outputs")
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

fn section_keys(body: &Value, section: &str) -> Vec<String> {
    body.get(section)
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

/// Parses a JSON or YAML document based on its first non-whitespace character.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim_start().starts_with('{') {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Reads the `parameters` section of an environment file.
///
/// Missing sections yield an empty map.
pub fn load_environment(path: impl AsRef<Path>) -> Result<HashMap<String, Value>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let doc = parse_document(&text)?;
    let params = doc
        .get("parameters")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Ok(params)
}
