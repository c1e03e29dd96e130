//! Loader configuration.
//!
//! Configuration is layered: built-in defaults, then an optional JSON
//! document, then environment variable overrides.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults;
use crate::loader::paths::PathTemplates;

/// Selects the runtime environment the loader is serving.
pub const ENV_ENVIRONMENT: &str = "COMPONENT_LOADER_ENV";
/// Base URL joined onto candidate paths by the HTTP source.
pub const ENV_BASE_URL: &str = "COMPONENT_LOADER_BASE_URL";
/// Per-candidate timeout override in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "COMPONENT_LOADER_TIMEOUT_MS";

/// Errors raised while building a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Invalid path template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Runtime environment the fragments are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Interactively served development context
    Development,
    /// Deployed build
    #[default]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Settings for the loading indicator shown while fragments resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingSettings {
    #[serde(default = "defaults::show_loading_indicator")]
    pub show_loading_indicator: bool,
    #[serde(default = "defaults::loading_text")]
    pub loading_text: String,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            show_loading_indicator: defaults::SHOW_LOADING_INDICATOR,
            loading_text: defaults::loading_text(),
        }
    }
}

/// Configuration for a [`ComponentLoader`](crate::ComponentLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "defaults::placeholder_attribute")]
    pub placeholder_attribute: String,
    #[serde(default = "defaults::component_timeout_ms")]
    pub component_timeout_ms: u64,
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "defaults::log_component_loading")]
    pub log_component_loading: bool,
    #[serde(default)]
    pub path_templates: Option<PathTemplates>,
    #[serde(default)]
    pub loading: LoadingSettings,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            placeholder_attribute: defaults::placeholder_attribute(),
            component_timeout_ms: defaults::COMPONENT_TIMEOUT_MS,
            retry_attempts: defaults::RETRY_ATTEMPTS,
            log_component_loading: defaults::LOG_COMPONENT_LOADING,
            path_templates: None,
            loading: LoadingSettings::default(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration for the given environment.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Defaults with environment variable overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Split out from [`LoaderConfig::from_env`] so lookups can be injected.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            let base_url = base_url.trim();
            self.base_url = (!base_url.is_empty()).then(|| base_url.to_string());
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.component_timeout_ms =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_MS,
                        value: timeout.clone(),
                    })?;
        }

        self.validate()
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.component_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "component_timeout_ms",
                value: "0".into(),
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retry_attempts",
                value: "0".into(),
            });
        }
        if self.placeholder_attribute.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "placeholder_attribute",
                value: self.placeholder_attribute.clone(),
            });
        }
        if let Some(ref templates) = self.path_templates {
            templates.validate()?;
        }
        Ok(())
    }

    /// Per-candidate timeout.
    pub fn component_timeout(&self) -> Duration {
        Duration::from_millis(self.component_timeout_ms)
    }

    /// Path templates in effect, falling back to the built-in table.
    pub fn templates(&self) -> PathTemplates {
        self.path_templates.clone().unwrap_or_default()
    }
}
