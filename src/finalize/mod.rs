//! Turning the chosen homepage into a published document and an active theme.
//!
//! Finalize is a short linear state machine:
//!
//! ```text
//! Publishing ──► Theming ──► Activating ──► Done
//! ```
//!
//! - **Publishing**: switch the site to a static front page, publish one
//!   document for the active variant and one per other favorite, and point
//!   the front page at the active variant's document.
//! - **Theming**: write a child theme for the same variants.
//! - **Activating**: activate the active variant's child theme.
//!
//! A [`FinalizeCheckpoint`] is stored under `sitegen-finalize-<child slug>`
//! after every document and every stage. Nothing is rolled back on failure;
//! instead a rerun for the same child theme reuses the documents it already
//! published (as long as they still exist and the variant's title and
//! content are unchanged), rewrites the theme files and activates again. A publish failure stops before any theme is touched.

use crate::config::SiteConfig;
use crate::constants::{FINALIZE_KEY_PREFIX, HOMEPAGE_META_KEY};
use crate::core::{Result, SiteGenError};
use crate::models::HomepageVariant;
use crate::site::{DocumentPublisher, ShowOnFront, SiteSettings};
use crate::store::{SessionStore, Transaction, load_optional};
use crate::theme::{ThemeHost, generate_child_theme};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub use crate::theme::child_theme_slug;

/// Finalize progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizeStage {
    /// Publishing homepage documents
    Publishing,
    /// Writing child themes
    Theming,
    /// Activating the child theme
    Activating,
    /// Finished
    Done,
}

/// Persisted progress of one finalize run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeCheckpoint {
    /// Last stage reached
    pub stage: FinalizeStage,
    /// Published document ids by variant slug
    pub documents: BTreeMap<String, String>,
    /// Title and content digest of each published document, by variant slug
    #[serde(default)]
    pub fingerprints: BTreeMap<String, String>,
    /// Child themes written so far
    pub themes: Vec<String>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl FinalizeCheckpoint {
    fn new() -> Self {
        Self {
            stage: FinalizeStage::Publishing,
            documents: BTreeMap::new(),
            fingerprints: BTreeMap::new(),
            themes: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Outcome of a successful finalize.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeReport {
    /// The activated child theme
    pub child_slug: String,
    /// Front-page document id
    pub front_page: String,
    /// Document ids by variant slug
    pub documents: BTreeMap<String, String>,
    /// Child themes written
    pub themes: Vec<String>,
    /// Documents reused from an earlier attempt
    pub reused_documents: usize,
}

/// Runs finalize against the site and theme collaborators.
pub struct Finalizer {
    store: Arc<dyn SessionStore>,
    settings: Arc<dyn SiteSettings>,
    publisher: Arc<dyn DocumentPublisher>,
    themes: Arc<dyn ThemeHost>,
    site: SiteConfig,
}

impl Finalizer {
    /// Create a finalizer.
    pub fn new(
        store: Arc<dyn SessionStore>,
        settings: Arc<dyn SiteSettings>,
        publisher: Arc<dyn DocumentPublisher>,
        themes: Arc<dyn ThemeHost>,
        site: SiteConfig,
    ) -> Self {
        Self {
            store,
            settings,
            publisher,
            themes,
            site,
        }
    }

    /// The stored checkpoint for a child theme, if finalize ever ran for it.
    pub fn checkpoint(&self, child_slug: &str) -> Result<Option<FinalizeCheckpoint>> {
        Ok(load_optional(self.store.as_ref(), &checkpoint_key(child_slug))?.value)
    }

    /// Finalize `active`, also publishing and theming the other favorites in `all`.
    ///
    /// `screenshot` is a base64 image for the active variant's child theme;
    /// every other child theme copies the parent's screenshot.
    pub fn finalize(
        &self,
        active: &HomepageVariant,
        all: &[HomepageVariant],
        screenshot: Option<&str>,
    ) -> Result<FinalizeReport> {
        let child_slug = child_theme_slug(&self.site.parent_theme, &active.slug);
        let key = checkpoint_key(&child_slug);

        let stored = load_optional::<FinalizeCheckpoint>(self.store.as_ref(), &key)?;
        let mut version = stored.version;
        let mut checkpoint = match stored.value {
            Some(previous) => {
                debug!(child = %child_slug, stage = ?previous.stage, "Resuming finalize");
                FinalizeCheckpoint {
                    stage: FinalizeStage::Publishing,
                    themes: Vec::new(),
                    ..previous
                }
            }
            None => FinalizeCheckpoint::new(),
        };

        let targets: Vec<&HomepageVariant> = std::iter::once(active)
            .chain(all.iter().filter(|v| v.is_favorite && v.slug != active.slug))
            .collect();

        // Publishing
        if self.settings.show_on_front()? == ShowOnFront::Posts {
            self.settings.set_show_on_front(ShowOnFront::Page)?;
        }

        let mut reused_documents = 0;
        let mut metadata = BTreeMap::new();
        metadata.insert(HOMEPAGE_META_KEY.to_string(), Value::Bool(true));

        for variant in &targets {
            let fingerprint = document_fingerprint(variant);
            if let Some(id) = checkpoint.documents.get(&variant.slug) {
                let unchanged = checkpoint.fingerprints.get(&variant.slug) == Some(&fingerprint);
                if unchanged && self.publisher.exists(id)? {
                    debug!(slug = %variant.slug, id = %id, "Reusing published document");
                    reused_documents += 1;
                    continue;
                }
            }

            let id = self
                .publisher
                .publish(&variant.title, &variant.content, true, &metadata)
                .map_err(|e| match e {
                    SiteGenError::PublishFailed {
                        ..
                    } => e,
                    other => SiteGenError::PublishFailed {
                        title: variant.title.clone(),
                        reason: other.to_string(),
                    },
                })?;
            checkpoint.documents.insert(variant.slug.clone(), id);
            checkpoint.fingerprints.insert(variant.slug.clone(), fingerprint);
            self.save(&key, &mut version, &mut checkpoint)?;
        }

        let front_page = checkpoint
            .documents
            .get(&active.slug)
            .cloned()
            .ok_or_else(|| SiteGenError::not_found(format!("document for '{}'", active.slug)))?;
        self.settings.set_front_page(&front_page)?;

        checkpoint.stage = FinalizeStage::Theming;
        self.save(&key, &mut version, &mut checkpoint)?;

        // Theming
        for variant in &targets {
            let shot = if variant.slug == active.slug { screenshot } else { None };
            let spec = generate_child_theme(
                self.themes.as_ref(),
                self.settings.as_ref(),
                &self.site,
                variant,
                shot,
            )?;
            checkpoint.themes.push(spec.child_slug);
        }

        checkpoint.stage = FinalizeStage::Activating;
        self.save(&key, &mut version, &mut checkpoint)?;

        // Activating
        self.themes.activate(&child_slug)?;

        checkpoint.stage = FinalizeStage::Done;
        self.save(&key, &mut version, &mut checkpoint)?;

        info!(
            child = %child_slug,
            documents = checkpoint.documents.len(),
            reused = reused_documents,
            "Finalize complete"
        );

        Ok(FinalizeReport {
            child_slug,
            front_page,
            documents: checkpoint.documents,
            themes: checkpoint.themes,
            reused_documents,
        })
    }

    fn save(&self, key: &str, version: &mut u64, checkpoint: &mut FinalizeCheckpoint) -> Result<()> {
        checkpoint.updated_at = Utc::now();
        let mut tx = Transaction::new();
        tx.put(key, *version, checkpoint)?;
        tx.commit(self.store.as_ref())?;
        *version += 1;
        Ok(())
    }
}

fn checkpoint_key(child_slug: &str) -> String {
    format!("{FINALIZE_KEY_PREFIX}{child_slug}")
}

/// Variant slugs restart at `version1` on every fresh generation, so a
/// document is only reusable while its title and body are unchanged.
fn document_fingerprint(variant: &HomepageVariant) -> String {
    let mut hasher = Sha256::new();
    hasher.update(variant.title.as_bytes());
    hasher.update([0u8]);
    hasher.update(variant.content.as_bytes());
    hex::encode(hasher.finalize())
}
