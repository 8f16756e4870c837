//! Cloud credentials
//!
//! Looked up in this order:
//! 1. `OS_*` environment variables
//! 2. `~/.config/stackflow/credentials.yaml`

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "credentials.yaml";

fn default_domain() -> String {
    "Default".to_string()
}

fn default_interface() -> String {
    "public".to_string()
}

fn default_identity_version() -> u8 {
    3
}

/// Credentials handed through to every platform binding.
///
/// The orchestration layer never inspects them beyond the presence checks
/// in [`OsCreds::validate`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsCreds {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    #[serde(default = "default_domain")]
    pub user_domain_name: String,
    #[serde(default = "default_domain")]
    pub project_domain_name: String,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default = "default_interface")]
    pub interface: String,
    #[serde(default = "default_identity_version")]
    pub identity_api_version: u8,
}

impl std::fmt::Debug for OsCreds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsCreds")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("project_name", &self.project_name)
            .field("region_name", &self.region_name)
            .finish()
    }
}

impl OsCreds {
    pub fn new(
        auth_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Result<Self> {
        let creds = Self {
            auth_url: auth_url.into(),
            username: username.into(),
            password: password.into(),
            project_name: project_name.into(),
            user_domain_name: default_domain(),
            project_domain_name: default_domain(),
            region_name: None,
            interface: default_interface(),
            identity_api_version: default_identity_version(),
        };
        creds.validate()?;
        Ok(creds)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("auth_url", &self.auth_url),
            ("username", &self.username),
            ("password", &self.password),
            ("project_name", &self.project_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Credentials(format!("{} is required", field)));
            }
        }
        if !matches!(self.identity_api_version, 2 | 3) {
            return Err(ConfigError::Credentials(format!(
                "unsupported identity API version {}",
                self.identity_api_version
            )));
        }
        Ok(())
    }

    /// Builds credentials from the standard `OS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        fn var(key: &str) -> Result<String> {
            std::env::var(key)
                .map_err(|_| ConfigError::Credentials(format!("{} is not set", key)))
        }

        let mut creds = Self {
            auth_url: var("OS_AUTH_URL")?,
            username: var("OS_USERNAME")?,
            password: var("OS_PASSWORD")?,
            project_name: var("OS_PROJECT_NAME").or_else(|_| var("OS_TENANT_NAME"))?,
            user_domain_name: var("OS_USER_DOMAIN_NAME").unwrap_or_else(|_| default_domain()),
            project_domain_name: var("OS_PROJECT_DOMAIN_NAME")
                .unwrap_or_else(|_| default_domain()),
            region_name: std::env::var("OS_REGION_NAME").ok(),
            interface: var("OS_INTERFACE").unwrap_or_else(|_| default_interface()),
            identity_api_version: default_identity_version(),
        };
        if let Ok(version) = std::env::var("OS_IDENTITY_API_VERSION") {
            creds.identity_api_version = version
                .trim()
                .parse::<f32>()
                .map(|v| v as u8)
                .map_err(|_| {
                    ConfigError::Credentials(format!(
                        "OS_IDENTITY_API_VERSION is not a number: {}",
                        version
                    ))
                })?;
        }
        creds.validate()?;
        Ok(creds)
    }

    /// Reads credentials from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let value = crate::template::parse_document(&text)?;
        let creds: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;
        creds.validate()?;
        Ok(creds)
    }

    /// Environment first, then the per-user credentials file.
    pub fn load() -> Result<Self> {
        match Self::from_env() {
            Ok(creds) => Ok(creds),
            Err(env_err) => match credentials_path() {
                Some(path) if path.exists() => {
                    tracing::debug!("Loading credentials from {}", path.display());
                    Self::from_file(path)
                }
                _ => Err(env_err),
            },
        }
    }
}

/// `~/.config/stackflow/credentials.yaml`
pub fn credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stackflow").join(CREDENTIALS_FILE))
}
