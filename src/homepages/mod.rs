//! Homepage variant generation, regeneration and favorites.
//!
//! [`HomepageService`] owns every read-modify-write of the session's homepage
//! records:
//!
//! | Key | Contents |
//! |-----|----------|
//! | `sitegen-prompt` | [`SitePrompt`] |
//! | `sitegen-homepages` | canonical variant set, in display order |
//! | `sitegen-regenerate-homepages` | FIFO of pre-generated alternates |
//! | `sitegen-colorpalette` | cached palette candidate set |
//!
//! Backend calls happen once per operation, before any store access. The
//! store mutation that follows runs under [`retry_on_conflict`] so a
//! concurrent request cannot stomp the set or the buffer; on a lost race the
//! mutation is recomputed from fresh reads while the generated content is
//! reused.
//!
//! # Example
//!
//! ```rust,no_run
//! use sitegen_onboarding::backend::HttpBackend;
//! use sitegen_onboarding::homepages::HomepageService;
//! use sitegen_onboarding::models::SitePrompt;
//! use sitegen_onboarding::store::MemoryStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> sitegen_onboarding::core::Result<()> {
//! let backend = HttpBackend::new("https://ai.example.com/", None, Duration::from_secs(60))?;
//! let service = HomepageService::new(Arc::new(MemoryStore::new()), Arc::new(backend));
//!
//! let prompt = SitePrompt::new("A bakery in Lisbon", "warm", "locals");
//! service.set_prompt(&prompt).await?;
//! let variants = service.generate(&prompt, false).await?;
//! service.toggle_favorite(&variants[0].slug).await?;
//! # Ok(())
//! # }
//! ```

mod favorites;
mod generator;
mod regenerate;
pub mod version;

pub use favorites::copy_name;
pub use version::next_version;

use crate::backend::GenerationBackend;
use crate::constants::{HOMEPAGES_KEY, PALETTE_CACHE_KEY, PROMPT_KEY, REGENERATE_BUFFER_KEY};
use crate::core::{Result, SiteGenError};
use crate::models::{HomepageVariant, SitePrompt};
use crate::palette::{PaletteCandidateSet, PaletteSource};
use crate::store::{SessionStore, Transaction, load, load_optional, retry_on_conflict};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Generates and curates the homepage variants of one onboarding session.
pub struct HomepageService {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn GenerationBackend>,
    rng: Mutex<StdRng>,
}

impl HomepageService {
    /// Create a service drawing palettes from an entropy-seeded generator.
    pub fn new(store: Arc<dyn SessionStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_rng(store, backend, StdRng::from_entropy())
    }

    /// Create a service with a fixed seed, for reproducible palette draws.
    pub fn with_seed(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn GenerationBackend>,
        seed: u64,
    ) -> Self {
        Self::with_rng(store, backend, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn GenerationBackend>,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            backend,
            rng: Mutex::new(rng),
        }
    }

    /// The session store this service writes to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Record the session prompt.
    ///
    /// A changed prompt drops the cached palette candidates, which were
    /// generated for the previous description.
    pub async fn set_prompt(&self, prompt: &SitePrompt) -> Result<()> {
        retry_on_conflict("set_prompt", || {
            let current = load_optional::<SitePrompt>(self.store.as_ref(), PROMPT_KEY)?;
            if current.value.as_ref() == Some(prompt) {
                return Ok(());
            }

            let mut tx = Transaction::new();
            tx.put(PROMPT_KEY, current.version, prompt)?;

            let cache = load_optional::<PaletteCandidateSet>(self.store.as_ref(), PALETTE_CACHE_KEY)?;
            if cache.value.is_some() {
                tx.put(PALETTE_CACHE_KEY, cache.version, &serde_json::Value::Null)?;
            }
            tx.try_commit(self.store.as_ref())?;

            info!(description = %prompt.site_description, "Session prompt updated");
            Ok(())
        })
        .await
    }

    /// The session prompt, or [`SiteGenError::NotFound`] before one is set.
    pub fn prompt(&self) -> Result<SitePrompt> {
        load_optional::<SitePrompt>(self.store.as_ref(), PROMPT_KEY)?
            .value
            .ok_or_else(|| SiteGenError::not_found("session prompt"))
    }

    /// The persisted variant set in display order.
    pub fn variants(&self) -> Result<Vec<HomepageVariant>> {
        Ok(load::<Vec<HomepageVariant>>(self.store.as_ref(), HOMEPAGES_KEY)?.value)
    }

    /// Pre-generated alternates waiting in the regeneration buffer.
    pub fn buffered(&self) -> Result<Vec<HomepageVariant>> {
        Ok(load::<Vec<HomepageVariant>>(self.store.as_ref(), REGENERATE_BUFFER_KEY)?.value)
    }

    /// The palette candidate set for the session prompt.
    pub async fn palettes(&self) -> Result<PaletteCandidateSet> {
        PaletteSource::new(self.store.as_ref(), self.backend.as_ref()).get_palettes().await
    }

    /// Look up one persisted variant.
    pub fn variant(&self, slug: &str) -> Result<HomepageVariant> {
        self.variants()?
            .into_iter()
            .find(|v| v.slug == slug)
            .ok_or_else(|| SiteGenError::not_found(format!("homepage '{slug}'")))
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        // A poisoned generator is still a valid generator
        self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
