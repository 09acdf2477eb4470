use super::HomepageService;
use super::version::{next_version, version_slug, version_title};
use crate::constants::{HOMEPAGES_KEY, REGENERATE_BUFFER_KEY};
use crate::core::{Result, SiteGenError};
use crate::models::{ColorPalette, HomepageVariant, SitePrompt};
use crate::palette;
use crate::store::{Transaction, load, retry_on_conflict};
use tracing::{debug, info};

/// Generated content with its palette, not yet given a version.
#[derive(Debug, Clone)]
pub(super) struct Draft {
    content: String,
    header: Option<String>,
    footer: Option<String>,
    color: ColorPalette,
}

impl HomepageService {
    /// Generate a batch of homepage variants.
    ///
    /// With `regenerate == false` the batch becomes the new variant set,
    /// numbered from `version1`, and the regeneration buffer is cleared.
    /// With `regenerate == true` the batch is appended to the regeneration
    /// buffer, numbered after everything in the set and the buffer.
    ///
    /// Nothing is persisted when the backend fails.
    pub async fn generate(
        &self,
        prompt: &SitePrompt,
        regenerate: bool,
    ) -> Result<Vec<HomepageVariant>> {
        let drafts = self.draft_batch(prompt, regenerate).await?;
        let store = self.store.as_ref();

        if regenerate {
            return retry_on_conflict("refill_buffer", || {
                let set = load::<Vec<HomepageVariant>>(store, HOMEPAGES_KEY)?;
                let mut buffer = load::<Vec<HomepageVariant>>(store, REGENERATE_BUFFER_KEY)?;

                let batch = assign_versions(&drafts, set.value.iter().chain(buffer.value.iter()));
                buffer.value.extend(batch.iter().cloned());

                let mut tx = Transaction::new();
                tx.put(REGENERATE_BUFFER_KEY, buffer.version, &buffer.value)?;
                tx.try_commit(store)?;

                info!(count = batch.len(), buffered = buffer.value.len(), "Regeneration buffer refilled");
                Ok(batch)
            })
            .await;
        }

        retry_on_conflict("generate", || {
            let set = load::<Vec<HomepageVariant>>(store, HOMEPAGES_KEY)?;
            let buffer = load::<Vec<HomepageVariant>>(store, REGENERATE_BUFFER_KEY)?;

            let batch = assign_versions(&drafts, std::iter::empty());

            let mut tx = Transaction::new();
            tx.put(HOMEPAGES_KEY, set.version, &batch)?;
            if !buffer.value.is_empty() {
                tx.put(REGENERATE_BUFFER_KEY, buffer.version, &Vec::<HomepageVariant>::new())?;
            }
            tx.try_commit(store)?;

            info!(count = batch.len(), replaced = set.value.len(), "Homepage variants generated");
            Ok(batch)
        })
        .await
    }

    /// Call the backend and give each generated page its own palette.
    pub(super) async fn draft_batch(&self, prompt: &SitePrompt, regenerate: bool) -> Result<Vec<Draft>> {
        // Palettes first: a missing session prompt fails before the expensive call
        let candidates = self.palettes().await?;

        let pages = self
            .backend
            .get_home_pages(
                &prompt.site_description,
                &prompt.content_style,
                &prompt.target_audience,
                regenerate,
            )
            .await?;

        if pages.is_empty() {
            return Err(SiteGenError::generation("the backend returned no homepages"));
        }

        let colors = {
            let mut rng = self.rng();
            palette::pick_batch(&candidates, pages.len(), &mut *rng)?
        };
        Ok(pages
            .into_iter()
            .zip(colors)
            .map(|((key, page), color)| {
                debug!(key = %key, palette = %color.slug, "Drafted homepage");
                Draft {
                    content: page.content,
                    header: page.header,
                    footer: page.footer,
                    color,
                }
            })
            .collect())
    }
}

/// Number `drafts` consecutively after the highest version in `taken`.
pub(super) fn assign_versions<'a, I>(drafts: &[Draft], taken: I) -> Vec<HomepageVariant>
where
    I: IntoIterator<Item = &'a HomepageVariant>,
{
    let first = next_version(taken.into_iter().map(|v| v.slug.as_str()));
    drafts
        .iter()
        .zip(first..)
        .map(|(draft, n)| HomepageVariant {
            slug: version_slug(n),
            title: version_title(n),
            content: draft.content.clone(),
            header: draft.header.clone(),
            footer: draft.footer.clone(),
            color: draft.color.clone(),
            is_favorite: false,
        })
        .collect()
}
