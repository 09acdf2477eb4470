//! Per-invocation wiring of configuration, store and collaborators.

use super::CliConfig;
use crate::backend::{GenerationBackend, HomepagePayload, HttpBackend};
use crate::config::SiteGenConfig;
use crate::core::{Result as SiteGenResult, SiteGenError};
use crate::homepages::HomepageService;
use crate::models::SitePrompt;
use crate::site::StoreSite;
use crate::store::{FileStore, SessionStore};
use crate::theme::LocalThemes;
use crate::utils::{Spinner, sanitize_slug};
use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs for one session.
pub struct SessionContext {
    config: SiteGenConfig,
    store: Arc<dyn SessionStore>,
    session: String,
    progress: bool,
}

impl SessionContext {
    /// Load the configuration and open the session store.
    pub async fn open(cli: &CliConfig) -> Result<Self> {
        let config = SiteGenConfig::load_with_optional(cli.config_path.clone()).await?;
        Self::with_config(config, cli)
    }

    /// Open the session store described by an already loaded configuration.
    pub fn with_config(config: SiteGenConfig, cli: &CliConfig) -> Result<Self> {
        if cli.session.is_empty() || sanitize_slug(&cli.session) != cli.session.to_lowercase() {
            bail!(
                "Invalid session name '{}': use letters, digits and single dashes",
                cli.session
            );
        }

        let state_dir = config.state_dir()?;
        let store = FileStore::open(&state_dir, &cli.session)?;
        debug!(path = %store.path().display(), "Opened session store");

        Ok(Self {
            config,
            store: Arc::new(store),
            session: cli.session.clone(),
            progress: !cli.no_progress,
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &SiteGenConfig {
        &self.config
    }

    /// The session name.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// The session store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// The generation backend, or one that fails every call when no
    /// `backend.base_url` is configured.
    pub fn backend(&self) -> SiteGenResult<Arc<dyn GenerationBackend>> {
        let config = &self.config.backend;
        let backend: Arc<dyn GenerationBackend> = if config.base_url.trim().is_empty() {
            Arc::new(Unconfigured)
        } else {
            Arc::new(HttpBackend::new(config.base_url.clone(), config.token.clone(), config.timeout())?)
        };
        Ok(backend)
    }

    /// A homepage service over this session.
    pub fn homepages(&self) -> SiteGenResult<HomepageService> {
        Ok(HomepageService::new(self.store(), self.backend()?))
    }

    /// Site settings and document publishing over this session.
    #[must_use]
    pub fn site(&self) -> StoreSite {
        StoreSite::new(self.store())
    }

    /// The themes directory.
    pub fn themes(&self) -> Result<LocalThemes> {
        Ok(LocalThemes::new(self.config.themes_dir()?))
    }

    /// A spinner, hidden when progress is disabled.
    pub fn spinner(&self, message: &str) -> Spinner {
        if self.progress {
            Spinner::start(message)
        } else {
            Spinner::hidden()
        }
    }
}

/// Backend used when no base url is configured.
struct Unconfigured;

impl Unconfigured {
    fn error() -> SiteGenError {
        SiteGenError::ConfigError {
            message: "backend.base_url is not set".to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend for Unconfigured {
    async fn generate_site_meta(
        &self,
        _prompt: &SitePrompt,
        _identifier: &str,
        _skip_cache: bool,
    ) -> SiteGenResult<Value> {
        Err(Self::error())
    }

    async fn get_home_pages(
        &self,
        _site_description: &str,
        _content_style: &str,
        _target_audience: &str,
        _regenerate: bool,
    ) -> SiteGenResult<HomepagePayload> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> SiteGenConfig {
        SiteGenConfig {
            state_dir: Some(temp.path().join("state")),
            ..SiteGenConfig::default()
        }
    }

    #[test]
    fn test_opens_named_session() {
        let temp = TempDir::new().unwrap();
        let cli = CliConfig {
            session: "shop-2".to_string(),
            ..CliConfig::default()
        };

        let ctx = SessionContext::with_config(config_in(&temp), &cli).unwrap();

        assert_eq!(ctx.session(), "shop-2");
        assert!(temp.path().join("state").is_dir());
        assert_eq!(ctx.themes().unwrap().root(), temp.path().join("state").join("themes"));
    }

    #[test]
    fn test_rejects_path_like_session() {
        let temp = TempDir::new().unwrap();
        let cli = CliConfig {
            session: "../escape".to_string(),
            ..CliConfig::default()
        };

        assert!(SessionContext::with_config(config_in(&temp), &cli).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_with_config_error() {
        let temp = TempDir::new().unwrap();
        let ctx = SessionContext::with_config(config_in(&temp), &CliConfig::default()).unwrap();

        let backend = ctx.backend().unwrap();
        let err = backend.get_home_pages("a bakery", "warm", "locals", false).await.unwrap_err();

        assert!(matches!(err, SiteGenError::ConfigError { .. }));
    }
}
