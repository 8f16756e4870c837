//! Keystone project and user descriptors

use super::{Descriptor, default_domain, default_true, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub domain: String,
    pub description: Option<String>,
    pub enabled: bool,
    /// Quota overrides keyed by quota name (instances, cores, ...)
    pub quotas: HashMap<String, i64>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain: default_domain(),
            description: None,
            enabled: true,
            quotas: HashMap::new(),
        }
    }
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Descriptor for ProjectConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Project)?;
        require(&self.domain, "domain", ConfigError::Project)
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Project(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Role name -> project name
    #[serde(default)]
    pub roles: HashMap<String, String>,
    #[serde(default = "default_domain")]
    pub domain_name: String,
}

impl UserConfig {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            project_name: None,
            email: None,
            enabled: true,
            roles: HashMap::new(),
            domain_name: default_domain(),
        }
    }
}

impl Descriptor for UserConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::User)?;
        require(&self.password, "password", ConfigError::User)
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::User(message.into())
    }
}
