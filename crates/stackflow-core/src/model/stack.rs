//! Heat stack descriptor and creation payload

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Default seconds to wait for a stack to reach CREATE_COMPLETE
pub const STACK_COMPLETE_TIMEOUT: u64 = 1200;

/// Heat stack descriptor
///
/// Exactly one of `template` (in-memory document) or `template_path`
/// must be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub name: String,
    pub template: Option<serde_json::Value>,
    pub template_path: Option<PathBuf>,
    /// Template parameter overrides
    pub env_values: HashMap<String, serde_json::Value>,
    /// Seconds to wait for creation to finish
    pub stack_create_timeout: u64,
    /// Auxiliary files referenced by the template (nested templates, scripts)
    pub resource_files: Vec<PathBuf>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            template: None,
            template_path: None,
            env_values: HashMap::new(),
            stack_create_timeout: STACK_COMPLETE_TIMEOUT,
            resource_files: Vec::new(),
        }
    }
}

impl StackConfig {
    pub fn from_template(name: impl Into<String>, template: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            template: Some(template),
            ..Default::default()
        }
    }

    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            template_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_env_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.env_values.insert(key.into(), value);
        self
    }

    pub fn with_resource_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_files.push(path.into());
        self
    }

    /// Loads the template and auxiliary files into a creation payload.
    ///
    /// Template format errors surface here, before the platform is contacted.
    pub fn build_request(&self) -> Result<StackRequest> {
        self.validate()?;

        let template = match (&self.template, &self.template_path) {
            (Some(body), _) => Template::from_value(body.clone())?,
            (None, Some(path)) => Template::load(path)?,
            (None, None) => {
                return Err(ConfigError::Stack(
                    "template or template_path is required".to_string(),
                ));
            }
        };

        let mut files = HashMap::new();
        for path in &self.resource_files {
            let key = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    ConfigError::Stack(format!("invalid resource file path: {}", path.display()))
                })?
                .to_string();
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
            debug!(file = %key, bytes = content.len(), "Loaded stack resource file");
            files.insert(key, content);
        }

        Ok(StackRequest {
            name: self.name.clone(),
            template: template.into_body(),
            parameters: self.env_values.clone(),
            files,
            timeout_mins: self.stack_create_timeout.div_ceil(60),
        })
    }
}

impl Descriptor for StackConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Stack)?;
        match (&self.template, &self.template_path) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Stack(
                    "template and template_path are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Stack(
                    "template or template_path is required".to_string(),
                ));
            }
            (Some(body), None) => Template::check_version(body)?,
            (None, Some(_)) => {}
        }
        if self.stack_create_timeout == 0 {
            return Err(ConfigError::Stack(
                "stack_create_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Stack(message.into())
    }
}

/// Payload sent to the orchestration service to create a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackRequest {
    pub name: String,
    pub template: serde_json::Value,
    pub parameters: HashMap<String, serde_json::Value>,
    /// Auxiliary file contents keyed by base file name
    pub files: HashMap<String, String>,
    pub timeout_mins: u64,
}
