//! User configuration for the `sitegen` CLI.
//!
//! A single TOML file holds the generation backend credentials, the site
//! identity stamped into generated themes, and the directories the CLI works
//! in. Every field has a default, so a missing file is a valid configuration
//! (only `backend.base_url` is required before calling the backend).
//!
//! # Location
//!
//! 1. The path passed with `--config`
//! 2. The `SITEGEN_CONFIG` environment variable
//! 3. `~/.sitegen/config.toml`
//!
//! # Example
//!
//! ```toml
//! state_dir = "/var/lib/sitegen"
//!
//! [backend]
//! base_url = "https://ai.example.com/"
//! token = "hiive-token"
//! timeout_secs = 60
//!
//! [site]
//! brand = "bluehost"
//! author = "Bluehost"
//! author_uri = "https://www.bluehost.com"
//! parent_theme = "yith-wonder"
//! ```
//!
//! # Security
//!
//! The backend token is a credential. [`SiteGenConfig::save_to`] writes the
//! file with mode 600 on Unix.

use crate::constants::{
    DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_BRAND, DEFAULT_PARENT_THEME, DEFAULT_PLACEHOLDER_TITLES,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "SITEGEN_CONFIG";

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteGenConfig {
    /// Generation backend connection
    pub backend: BackendConfig,
    /// Identity stamped into generated themes
    pub site: SiteConfig,
    /// Directory holding per-session store documents (default `~/.sitegen/state`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Directory holding installed themes (default `<state_dir>/themes`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes_dir: Option<PathBuf>,
}

/// `[backend]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base url of the generation API; endpoint names are appended to it
    pub base_url: String,
    /// Authentication token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// The request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[site]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Brand name used in stylesheets and synthesized site titles
    pub brand: String,
    /// Theme author
    pub author: String,
    /// Theme author url
    pub author_uri: String,
    /// Parent theme every child theme derives from
    pub parent_theme: String,
    /// Site titles treated as "never customised"
    pub placeholder_titles: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            author: String::new(),
            author_uri: String::new(),
            parent_theme: DEFAULT_PARENT_THEME.to_string(),
            placeholder_titles: DEFAULT_PLACEHOLDER_TITLES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SiteConfig {
    /// Whether `title` is empty or one of the placeholder titles.
    #[must_use]
    pub fn is_placeholder_title(&self, title: &str) -> bool {
        let title = title.trim();
        title.is_empty() || self.placeholder_titles.iter().any(|p| p == title)
    }
}

impl SiteGenConfig {
    /// Load from `path`, else `SITEGEN_CONFIG`, else the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => PathBuf::from(path),
                None => Self::default_path()?,
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Write to `path`, readable by the owner only on Unix.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set secure permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// `~/.sitegen/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// The configured state directory, or `~/.sitegen/state`.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::home_dir()?.join("state")),
        }
    }

    /// The configured themes directory, or `<state_dir>/themes`.
    pub fn themes_dir(&self) -> Result<PathBuf> {
        match &self.themes_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.state_dir()?.join("themes")),
        }
    }

    fn home_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".sitegen"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = SiteGenConfig::load_with_optional(Some(temp.path().join("none.toml")))
            .await
            .unwrap();

        assert_eq!(config, SiteGenConfig::default());
        assert_eq!(config.backend.timeout_secs, 60);
        assert_eq!(config.site.parent_theme, "yith-wonder");
        assert_eq!(config.site.brand, "bluehost");
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "state_dir = \"/srv/sitegen\"\n\n[backend]\nbase_url = \"https://ai.example.com/\"\n",
        )
        .unwrap();

        let config = SiteGenConfig::load_from(&path).await.unwrap();

        assert_eq!(config.backend.base_url, "https://ai.example.com/");
        assert_eq!(config.backend.timeout(), Duration::from_secs(60));
        assert_eq!(config.site.brand, "bluehost");
        assert_eq!(config.state_dir().unwrap(), PathBuf::from("/srv/sitegen"));
        assert_eq!(config.themes_dir().unwrap(), PathBuf::from("/srv/sitegen/themes"));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[backend\nbase_url = 1").unwrap();

        assert!(SiteGenConfig::load_from(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = SiteGenConfig::default();
        config.backend.token = Some("secret".to_string());
        config.site.author = "Bluehost".to_string();
        config.save_to(&path).await.unwrap();

        let loaded = SiteGenConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_config_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        SiteGenConfig::default().save_to(&path).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "Config file should have 600 permissions");
    }

    #[test]
    fn test_placeholder_titles() {
        let site = SiteConfig::default();
        assert!(site.is_placeholder_title(""));
        assert!(site.is_placeholder_title("  "));
        assert!(site.is_placeholder_title("My WordPress Site"));
        assert!(!site.is_placeholder_title("Pastelaria Lisboa"));
    }
}
