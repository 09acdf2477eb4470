use super::HomepageService;
use super::generator::{Draft, assign_versions};
use super::version::{next_version, version_slug, version_title};
use crate::constants::{HOMEPAGES_KEY, REGENERATE_BUFFER_KEY};
use crate::core::Result;
use crate::models::{HomepageVariant, SitePrompt};
use crate::store::{Transaction, load, retry_on_conflict};
use tracing::{debug, info};

impl HomepageService {
    /// Show one more variant, preferring the regeneration buffer.
    ///
    /// The head of the buffer is moved to the end of the variant set. Only
    /// when the buffer is empty is the backend asked for a fresh batch, which
    /// becomes the new buffer minus the item returned. The variant set only
    /// grows here, so favorites are never lost.
    pub async fn regenerate_one(&self, prompt: &SitePrompt) -> Result<HomepageVariant> {
        let mut fresh = None;
        if self.buffered()?.is_empty() {
            fresh = Some(self.draft_batch(prompt, true).await?);
        }

        loop {
            let drafts = fresh.as_deref();
            if let Some(variant) =
                retry_on_conflict("regenerate_one", || self.pop_buffered(drafts)).await?
            {
                return Ok(variant);
            }

            // Another request drained the buffer after we looked at it
            debug!("Regeneration buffer drained concurrently, fetching a fresh batch");
            fresh = Some(self.draft_batch(prompt, true).await?);
        }
    }

    /// Move the buffer head into the set. `None` if the buffer is empty and
    /// there is no fresh batch to refill it with.
    fn pop_buffered(&self, fresh: Option<&[Draft]>) -> Result<Option<HomepageVariant>> {
        let store = self.store.as_ref();
        let mut set = load::<Vec<HomepageVariant>>(store, HOMEPAGES_KEY)?;
        let mut buffer = load::<Vec<HomepageVariant>>(store, REGENERATE_BUFFER_KEY)?;

        let refilled = buffer.value.is_empty();
        if refilled {
            match fresh {
                Some(drafts) if !drafts.is_empty() => {
                    buffer.value = assign_versions(drafts, set.value.iter());
                }
                _ => return Ok(None),
            }
        }

        let mut variant = buffer.value.remove(0);
        if set.value.iter().any(|v| v.slug == variant.slug) {
            let n = next_version(
                set.value.iter().chain(buffer.value.iter()).map(|v| v.slug.as_str()),
            );
            debug!(from = %variant.slug, to = n, "Re-versioning buffered homepage");
            variant.slug = version_slug(n);
            variant.title = version_title(n);
        }
        set.value.push(variant.clone());

        let mut tx = Transaction::new();
        tx.put(HOMEPAGES_KEY, set.version, &set.value)?;
        tx.put(REGENERATE_BUFFER_KEY, buffer.version, &buffer.value)?;
        tx.try_commit(store)?;

        info!(
            slug = %variant.slug,
            refilled,
            remaining = buffer.value.len(),
            "Regenerated homepage"
        );
        Ok(Some(variant))
    }
}
