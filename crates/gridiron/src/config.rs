//! Page configuration.
//!
//! Two values drive a page: the XML namespace that marks framework tags
//! (`gi` in `<gi::Label>`) and the document root templates are resolved
//! against. They come from code, from the `GRIDIRON_XHTML_NS` /
//! `GRIDIRON_HTML_DOCROOT` environment variables, or from a TOML file:
//!
//! ```toml
//! namespace = "gi"
//! document_root = "docroot"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the framework tag namespace.
pub const NAMESPACE_ENV: &str = "GRIDIRON_XHTML_NS";

/// Environment variable holding the template document root.
pub const DOCROOT_ENV: &str = "GRIDIRON_HTML_DOCROOT";

pub const DEFAULT_NAMESPACE: &str = "gi";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration value: set {0}")]
    Missing(&'static str),

    #[error("Invalid namespace '{0}': use ASCII letters, digits, '_' or '-'")]
    InvalidNamespace(String),

    #[error("Unable to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config file: {0}")]
    Toml(String),
}

/// Page configuration options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Namespace prefix of framework tags
    pub namespace: String,

    /// Directory templates are resolved against
    #[serde(default = "default_document_root")]
    pub document_root: PathBuf,
}

fn default_document_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            document_root: default_document_root(),
        }
    }
}

impl Config {
    pub fn new(
        namespace: impl Into<String>,
        document_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            namespace: namespace.into(),
            document_root: document_root.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read both values from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read both values through `lookup`, keyed by the environment variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup(NAMESPACE_ENV).ok_or(ConfigError::Missing(NAMESPACE_ENV))?;
        let document_root = lookup(DOCROOT_ENV).ok_or(ConfigError::Missing(DOCROOT_ENV))?;
        Self::new(namespace, document_root)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_valid_namespace(&self.namespace) {
            Ok(())
        } else {
            Err(ConfigError::InvalidNamespace(self.namespace.clone()))
        }
    }

    /// Path of `template` under the document root.
    pub fn resolve(&self, template: &str) -> PathBuf {
        self.document_root.join(template)
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
