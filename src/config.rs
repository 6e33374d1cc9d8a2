//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file in the platform config
//! directory (overridable with `PMB_CONFIG`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::validate_email;

const CONFIG_FILE: &str = "config.toml";
const CONFIG_ENV: &str = "PMB_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Local UI defaults
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional bearer token, passed opaquely on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8000/graphql/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local UI defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Organization slug used when the session has none
    #[serde(default = "default_org")]
    pub default_org: String,

    /// Author email attached to new comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

fn default_org() -> String {
    "demo-org".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_org: default_org(),
            author_email: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the given path or the default location,
    /// falling back to defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let resolved = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };
        match resolved {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        self.api.validate()?;
        self.ui.validate()?;
        Ok(())
    }
}

impl ApiConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "api.endpoint cannot be empty".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(crate::error::Error::InvalidConfig(format!(
                "api.endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "api.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl UiConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let org = self.default_org.trim();
        if org.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "ui.default_org cannot be empty".to_string(),
            ));
        }
        if org.chars().any(|ch| ch.is_whitespace()) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "ui.default_org must be a slug, got '{org}'"
            )));
        }
        if let Some(email) = &self.author_email {
            validate_email(email).map_err(|_| {
                crate::error::Error::InvalidConfig(format!(
                    "ui.author_email is not a valid email: '{email}'"
                ))
            })?;
        }
        Ok(())
    }
}

/// Default config file location, honoring the `PMB_CONFIG` override.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Some(PathBuf::from(value));
        }
    }
    directories::ProjectDirs::from("", "", "pmb")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.api.endpoint, "http://localhost:8000/graphql/");
        assert!(cfg.api.token.is_none());
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.ui.default_org, "demo-org");
        assert!(cfg.ui.author_email.is_none());
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let content = r#"
[api]
endpoint = "https://pm.example.com/graphql/"
token = "secret"
timeout_secs = 5

[ui]
default_org = "acme"
author_email = "dev@example.com"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.api.endpoint, "https://pm.example.com/graphql/");
        assert_eq!(cfg.api.token.as_deref(), Some("secret"));
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.ui.default_org, "acme");
        assert_eq!(cfg.ui.author_email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn invalid_endpoint_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nendpoint = \"ftp://nope\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_secs = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_author_email_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\nauthor_email = \"not-an-email\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_or_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.toml");
        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(cfg.ui.default_org, "demo-org");
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\ndefault_org = \"acme\"").expect("write config");

        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(cfg.ui.default_org, "acme");
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out.toml");
        let cfg = Config::default();
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("endpoint = \"http://localhost:8000/graphql/\""));
        assert!(written.contains("default_org = \"demo-org\""));
    }
}
