//! In-memory stand-ins for the generation backend and the document publisher.

use super::fixtures;
use crate::backend::{GenerationBackend, HomepagePayload, parse_home_pages};
use crate::core::{Result, SiteGenError};
use crate::models::SitePrompt;
use crate::site::DocumentPublisher;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted [`GenerationBackend`] that counts its calls.
///
/// Answers `color_palette` with [`fixtures::palettes_json`] and home pages
/// with [`fixtures::home_pages_json`] until told otherwise.
pub struct StubBackend {
    palettes: Mutex<Value>,
    home_pages: Mutex<Value>,
    site_meta_failure: Mutex<Option<String>>,
    home_pages_failure: Mutex<Option<String>>,
    site_meta_calls: AtomicUsize,
    home_page_calls: AtomicUsize,
    regenerate_flags: Mutex<Vec<bool>>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBackend {
    /// A backend answering with the sample fixtures.
    pub fn new() -> Self {
        Self {
            palettes: Mutex::new(fixtures::palettes_json()),
            home_pages: Mutex::new(fixtures::home_pages_json()),
            site_meta_failure: Mutex::new(None),
            home_pages_failure: Mutex::new(None),
            site_meta_calls: AtomicUsize::new(0),
            home_page_calls: AtomicUsize::new(0),
            regenerate_flags: Mutex::new(Vec::new()),
        }
    }

    /// Replace the palette response.
    pub fn set_palettes(&self, palettes: Value) {
        *self.palettes.lock().unwrap() = palettes;
    }

    /// Replace the home pages response.
    pub fn set_home_pages(&self, home_pages: Value) {
        *self.home_pages.lock().unwrap() = home_pages;
    }

    /// Fail every site meta call with `reason` until cleared.
    pub fn fail_site_meta(&self, reason: &str) {
        *self.site_meta_failure.lock().unwrap() = Some(reason.to_string());
    }

    /// Fail every home pages call with `reason` until cleared.
    pub fn fail_home_pages(&self, reason: &str) {
        *self.home_pages_failure.lock().unwrap() = Some(reason.to_string());
    }

    /// Stop failing.
    pub fn clear_failures(&self) {
        *self.site_meta_failure.lock().unwrap() = None;
        *self.home_pages_failure.lock().unwrap() = None;
    }

    /// Number of site meta calls, failed ones included.
    pub fn site_meta_calls(&self) -> usize {
        self.site_meta_calls.load(Ordering::SeqCst)
    }

    /// Number of home pages calls, failed ones included.
    pub fn home_page_calls(&self) -> usize {
        self.home_page_calls.load(Ordering::SeqCst)
    }

    /// The `regenerate` flag of every home pages call, in order.
    pub fn regenerate_flags(&self) -> Vec<bool> {
        self.regenerate_flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn generate_site_meta(
        &self,
        _prompt: &SitePrompt,
        _identifier: &str,
        _skip_cache: bool,
    ) -> Result<Value> {
        self.site_meta_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.site_meta_failure.lock().unwrap().clone() {
            return Err(SiteGenError::generation(reason));
        }
        Ok(self.palettes.lock().unwrap().clone())
    }

    async fn get_home_pages(
        &self,
        _site_description: &str,
        _content_style: &str,
        _target_audience: &str,
        regenerate: bool,
    ) -> Result<HomepagePayload> {
        self.home_page_calls.fetch_add(1, Ordering::SeqCst);
        self.regenerate_flags.lock().unwrap().push(regenerate);
        if let Some(reason) = self.home_pages_failure.lock().unwrap().clone() {
            return Err(SiteGenError::generation(reason));
        }
        let payload = self.home_pages.lock().unwrap().clone();
        parse_home_pages(payload)
    }
}

/// [`DocumentPublisher`] that records titles and can fail on chosen ones.
#[derive(Default)]
pub struct StubPublisher {
    documents: Mutex<BTreeMap<String, String>>,
    published: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl StubPublisher {
    /// A publisher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject documents titled `title`.
    pub fn fail_on(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    /// Accept everything again.
    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Forget a published document, as if it was deleted on the site.
    pub fn delete(&self, document_id: &str) {
        self.documents.lock().unwrap().remove(document_id);
    }

    /// Titles of successful publishes, in order.
    pub fn published_titles(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    /// Number of publish calls, failed ones included.
    pub fn publish_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentPublisher for StubPublisher {
    fn publish(
        &self,
        title: &str,
        _content: &str,
        _no_title_template: bool,
        _metadata: &BTreeMap<String, Value>,
    ) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.lock().unwrap().contains(title) {
            return Err(SiteGenError::PublishFailed {
                title: title.to_string(),
                reason: "rejected by stub".to_string(),
            });
        }

        let id = format!("doc-{n}");
        self.documents.lock().unwrap().insert(id.clone(), title.to_string());
        self.published.lock().unwrap().push(title.to_string());
        Ok(id)
    }

    fn exists(&self, document_id: &str) -> Result<bool> {
        Ok(self.documents.lock().unwrap().contains_key(document_id))
    }
}
