use super::HomepageService;
use crate::constants::HOMEPAGES_KEY;
use crate::core::{Result, SiteGenError};
use crate::models::{ColorPalette, HomepageVariant};
use crate::palette;
use crate::store::{Transaction, load, retry_on_conflict};
use tracing::info;

impl HomepageService {
    /// Flip the favorite flag of `slug` and return the updated variant.
    pub async fn toggle_favorite(&self, slug: &str) -> Result<HomepageVariant> {
        let store = self.store.as_ref();
        retry_on_conflict("toggle_favorite", || {
            let mut set = load::<Vec<HomepageVariant>>(store, HOMEPAGES_KEY)?;
            let variant = set
                .value
                .iter_mut()
                .find(|v| v.slug == slug)
                .ok_or_else(|| SiteGenError::not_found(format!("homepage '{slug}'")))?;
            variant.is_favorite = !variant.is_favorite;
            let updated = variant.clone();

            let mut tx = Transaction::new();
            tx.put(HOMEPAGES_KEY, set.version, &set.value)?;
            tx.try_commit(store)?;

            info!(slug, favorite = updated.is_favorite, "Toggled favorite");
            Ok(updated)
        })
        .await
    }

    /// Append a copy of `slug` with a freshly drawn palette.
    ///
    /// The palette differs from `exclude` (the parent's own palette when
    /// `None`) whenever the candidate set allows it. The copy is named
    /// `"<title> (Copy)"` / `"<slug>-copy"`, with the suffix repeated until
    /// neither collides with the set.
    pub async fn duplicate_favorite(
        &self,
        slug: &str,
        exclude: Option<&ColorPalette>,
    ) -> Result<HomepageVariant> {
        let parent = self.variant(slug)?;
        let candidates = self.palettes().await?;
        let color = {
            let mut rng = self.rng();
            palette::pick_different(&candidates, exclude.unwrap_or(&parent.color), &mut *rng)?
        };

        let store = self.store.as_ref();
        retry_on_conflict("duplicate_favorite", || {
            let mut set = load::<Vec<HomepageVariant>>(store, HOMEPAGES_KEY)?;
            let parent = set
                .value
                .iter()
                .find(|v| v.slug == slug)
                .ok_or_else(|| SiteGenError::not_found(format!("homepage '{slug}'")))?;

            let (title, copy_slug) = copy_name(&parent.title, &parent.slug, &set.value);
            let copy = HomepageVariant {
                slug: copy_slug,
                title,
                color: color.clone(),
                is_favorite: false,
                ..parent.clone()
            };
            set.value.push(copy.clone());

            let mut tx = Transaction::new();
            tx.put(HOMEPAGES_KEY, set.version, &set.value)?;
            tx.try_commit(store)?;

            info!(parent = slug, slug = %copy.slug, palette = %copy.color.slug, "Duplicated homepage");
            Ok(copy)
        })
        .await
    }
}

/// Collision-free `(title, slug)` for a copy of `title` / `slug`.
///
/// Every existing variant blocks at most two candidates (one by title, one
/// by slug), so `2 * existing.len() + 1` candidates always contain a free one.
#[must_use]
pub fn copy_name(title: &str, slug: &str, existing: &[HomepageVariant]) -> (String, String) {
    let taken = |candidate: &str| existing.iter().any(|v| v.title == candidate || v.slug == candidate);

    let mut copy_title = format!("{title} (Copy)");
    let mut copy_slug = format!("{slug}-copy");
    for _ in 0..2 * existing.len() {
        if !taken(&copy_title) && !taken(&copy_slug) {
            break;
        }
        copy_title.push_str(" (Copy)");
        copy_slug.push_str("-copy");
    }
    (copy_title, copy_slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::{StubBackend, fixtures};
    use std::sync::Arc;

    async fn generated(seed: u64) -> HomepageService {
        let backend = Arc::new(StubBackend::new());
        let service = HomepageService::with_seed(Arc::new(MemoryStore::new()), backend, seed);
        let prompt = fixtures::prompt();
        service.set_prompt(&prompt).await.unwrap();
        service.generate(&prompt, false).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_record() {
        let service = generated(1).await;
        let before = service.variants().unwrap();

        assert!(service.toggle_favorite("version2").await.unwrap().is_favorite);
        assert!(!service.toggle_favorite("version2").await.unwrap().is_favorite);

        assert_eq!(service.variants().unwrap(), before);
    }

    #[tokio::test]
    async fn test_toggle_unknown_slug() {
        let service = generated(1).await;
        let err = service.toggle_favorite("version42").await.unwrap_err();
        assert!(matches!(err, SiteGenError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_twice_names_and_keeps_both() {
        let service = generated(2).await;

        let first = service.duplicate_favorite("version2", None).await.unwrap();
        let second = service.duplicate_favorite("version2", None).await.unwrap();

        assert_eq!(first.title, "Version 2 (Copy)");
        assert_eq!(first.slug, "version2-copy");
        assert_eq!(second.title, "Version 2 (Copy) (Copy)");
        assert_eq!(second.slug, "version2-copy-copy");

        let variants = service.variants().unwrap();
        assert_eq!(variants.len(), 5);
        assert!(variants.iter().any(|v| v.slug == "version2-copy"));
        assert!(variants.iter().any(|v| v.slug == "version2-copy-copy"));
    }

    #[tokio::test]
    async fn test_duplicate_copies_content_with_new_palette() {
        for seed in 0..20 {
            let service = generated(seed).await;
            let parent = service.variant("version1").unwrap();

            let copy = service.duplicate_favorite("version1", None).await.unwrap();

            assert_eq!(copy.content, parent.content);
            assert!(!copy.is_favorite);
            assert!(!copy.color.same_colors(&parent.color));
        }
    }

    #[tokio::test]
    async fn test_duplicate_does_not_shift_versions() {
        let service = generated(3).await;
        service.duplicate_favorite("version3", None).await.unwrap();

        let next = crate::homepages::next_version(
            service.variants().unwrap().iter().map(|v| v.slug.as_str()),
        );
        assert_eq!(next, 4);
    }

    #[tokio::test]
    async fn test_duplicate_unknown_slug() {
        let service = generated(1).await;
        let err = service.duplicate_favorite("nope", None).await.unwrap_err();
        assert!(matches!(err, SiteGenError::NotFound { .. }));
    }

    #[test]
    fn test_copy_name_skips_title_collisions() {
        let mut blocker = fixtures::variant("other", "Version 1 (Copy)");
        blocker.slug = "unrelated".to_string();

        let (title, slug) = copy_name("Version 1", "version1", &[blocker]);

        assert_eq!(title, "Version 1 (Copy) (Copy)");
        assert_eq!(slug, "version1-copy-copy");
    }
}
