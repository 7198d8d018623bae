//! Console configuration (svcprobe.toml)
//!
//! ```toml
//! [browser]
//! mount = "browser"
//! base-path = "/"
//! root-path = "/srv/app"
//! builtin-aliases = ["user", "page", "time", "config"]
//!
//! [services]
//! clock = "TimeService"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BuiltinAliases, DEFAULT_BUILTIN_ALIASES};
use crate::links::Links;
use crate::registry::is_valid_alias;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "svcprobe.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to write TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfig {
    /// Console settings
    #[serde(default)]
    pub browser: BrowserSection,

    /// Custom alias -> service type name
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

/// `[browser]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserSection {
    /// Mount path; its segments are skipped when resolving requests
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Site base path prefixed to every link
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Deployment root stripped from trace frames (default: working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,

    /// Aliases reserved for built-in services
    #[serde(default = "default_builtin_aliases")]
    pub builtin_aliases: Vec<String>,
}

fn default_mount() -> String {
    "browser".to_string()
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_builtin_aliases() -> Vec<String> {
    DEFAULT_BUILTIN_ALIASES.iter().map(|s| s.to_string()).collect()
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            mount: default_mount(),
            base_path: default_base_path(),
            root_path: None,
            builtin_aliases: default_builtin_aliases(),
        }
    }
}

impl BrowserConfig {
    /// Parse a config from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a config from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: BrowserConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mount = self.browser.mount.trim_matches('/');
        if mount.is_empty() {
            return Err(ConfigError::ValidationError(
                "browser.mount cannot be empty".to_string(),
            ));
        }
        if let Some(segment) = mount.split('/').find(|s| !is_valid_alias(s)) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid mount segment '{}'. Use letters, digits, '_' and '-'",
                segment
            )));
        }

        if self.browser.builtin_aliases.is_empty() {
            return Err(ConfigError::ValidationError(
                "browser.builtin-aliases cannot be empty".to_string(),
            ));
        }
        for alias in &self.browser.builtin_aliases {
            if !is_valid_alias(alias) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid built-in alias '{}'",
                    alias
                )));
            }
        }

        for (alias, type_name) in &self.services {
            if !is_valid_alias(alias) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid service alias '{}'. Use letters, digits, '_' and '-'",
                    alias
                )));
            }
            if type_name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Service '{}' has an empty type name",
                    alias
                )));
            }
        }

        Ok(())
    }

    /// Write the config to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Number of leading path segments that name the mount point
    pub fn ignore_count(&self) -> usize {
        self.mount_segments().count()
    }

    /// Mount path segments
    pub fn mount_segments(&self) -> impl Iterator<Item = &str> {
        self.browser.mount.split('/').filter(|s| !s.is_empty())
    }

    /// Root stripped from trace frames
    pub fn trace_root(&self) -> String {
        match &self.browser.root_path {
            Some(root) => root.to_string_lossy().into_owned(),
            None => std::env::current_dir()
                .map(|dir| dir.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Reserved built-in aliases
    pub fn builtin_aliases(&self) -> BuiltinAliases {
        BuiltinAliases::new(self.browser.builtin_aliases.iter().cloned())
    }

    /// Link builder for this mount
    pub fn links(&self) -> Links {
        Links::new(&self.browser.base_path, &self.browser.mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::from_str("").unwrap();
        assert_eq!(config.browser.mount, "browser");
        assert_eq!(config.browser.base_path, "/");
        assert_eq!(config.ignore_count(), 1);
        assert_eq!(config.builtin_aliases(), BuiltinAliases::default());
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[browser]
mount = "/admin/browser/"
base-path = "/site"
root-path = "/srv/app"
builtin-aliases = ["user", "time"]

[services]
clock = "TimeService"
mail = "app::Mailer"
"#;
        let config = BrowserConfig::from_str(toml).unwrap();
        assert_eq!(config.ignore_count(), 2);
        assert_eq!(config.trace_root(), "/srv/app");
        assert!(!config.builtin_aliases().contains("page"));
        assert_eq!(config.services["mail"], "app::Mailer");
        assert_eq!(config.links().service("clock"), "/site/admin/browser/clock");
    }

    #[test]
    fn test_empty_mount_rejected() {
        let toml = r#"
[browser]
mount = "/"
"#;
        assert!(matches!(
            BrowserConfig::from_str(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_alias_rejected() {
        let toml = r#"
[services]
"bad alias" = "Mailer"
"#;
        assert!(matches!(
            BrowserConfig::from_str(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_builtins_rejected() {
        let toml = r#"
[browser]
builtin-aliases = []
"#;
        assert!(BrowserConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            BrowserConfig::from_str("[browser"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_trace_root_defaults_to_working_directory() {
        let config = BrowserConfig::default();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.trace_root(), cwd.to_string_lossy());
    }
}
