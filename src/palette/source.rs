use super::RawPalette;
use crate::backend::{GenerationBackend, check_error_payload};
use crate::constants::{COLOR_PALETTE_IDENTIFIER, PALETTE_CACHE_KEY, PROMPT_KEY};
use crate::core::{Result, SiteGenError};
use crate::models::SitePrompt;
use crate::store::{SessionStore, Transaction, load_optional, retry_on_conflict};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Ordered raw palettes sourced once per session prompt.
pub type PaletteCandidateSet = Vec<RawPalette>;

/// Fetches the palette candidate set for the session prompt, caching it in the store.
pub struct PaletteSource<'a> {
    store: &'a dyn SessionStore,
    backend: &'a dyn GenerationBackend,
}

impl<'a> PaletteSource<'a> {
    /// Create a source over the session store and backend.
    pub fn new(store: &'a dyn SessionStore, backend: &'a dyn GenerationBackend) -> Self {
        Self {
            store,
            backend,
        }
    }

    /// Return the candidate set, calling the backend only on a cache miss.
    ///
    /// Fails with [`SiteGenError::NotFound`] before any backend call when the
    /// session has no prompt yet.
    pub async fn get_palettes(&self) -> Result<PaletteCandidateSet> {
        let prompt = load_optional::<SitePrompt>(self.store, PROMPT_KEY)?
            .value
            .ok_or_else(|| SiteGenError::not_found("session prompt"))?;

        let cached = load_optional::<PaletteCandidateSet>(self.store, PALETTE_CACHE_KEY)?;
        if let Some(palettes) = cached.value.filter(|p| !p.is_empty()) {
            debug!(count = palettes.len(), "Using cached palette candidates");
            return Ok(palettes);
        }

        let response = self
            .backend
            .generate_site_meta(&prompt, COLOR_PALETTE_IDENTIFIER, false)
            .await?;
        let palettes = parse_candidates(response)?;

        let stored = retry_on_conflict("cache_palettes", || {
            let current = load_optional::<PaletteCandidateSet>(self.store, PALETTE_CACHE_KEY)?;
            if current.value.as_ref().is_some_and(|p| !p.is_empty()) {
                return Ok(false);
            }
            let mut tx = Transaction::new();
            tx.put(PALETTE_CACHE_KEY, current.version, &palettes)?;
            tx.try_commit(self.store)?;
            Ok(true)
        })
        .await?;

        if stored {
            info!(count = palettes.len(), "Cached palette candidates");
        } else {
            // Another request cached a set first; ours is just as valid for this call
            warn!("Palette cache was written concurrently, keeping the stored set");
        }

        Ok(palettes)
    }
}

/// Accept either a bare array of palettes or an object wrapping one.
fn parse_candidates(response: Value) -> Result<PaletteCandidateSet> {
    check_error_payload(&response)?;

    let list = match response {
        Value::Array(_) => response,
        Value::Object(mut map) => map
            .remove("palettes")
            .or_else(|| map.remove(COLOR_PALETTE_IDENTIFIER))
            .ok_or_else(|| SiteGenError::InvalidPayload {
                reason: "palette response has no palette list".to_string(),
            })?,
        other => {
            return Err(SiteGenError::InvalidPayload {
                reason: format!("palette response is not a list: {other}"),
            });
        }
    };

    let palettes: PaletteCandidateSet =
        serde_json::from_value(list).map_err(|e| SiteGenError::InvalidPayload {
            reason: format!("malformed palette: {e}"),
        })?;

    if palettes.is_empty() {
        return Err(SiteGenError::generation("the backend returned no color palettes"));
    }
    Ok(palettes)
}
