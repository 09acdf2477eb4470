//! Site collaborators: front-page settings and document publishing.
//!
//! Finalize needs a handful of site options and a way to publish the chosen
//! homepage as a document. Both are traits so a host CMS can plug in its own
//! implementation; [`StoreSite`] keeps them in the session store next to the
//! homepage records, which is what the CLI uses.

use crate::core::{Result, SiteGenError};
use crate::store::{SessionStore, Transaction, load_optional};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const SHOW_ON_FRONT: &str = "show_on_front";
const PAGE_ON_FRONT: &str = "page_on_front";
const BLOGNAME: &str = "blogname";
const SITEURL: &str = "siteurl";
const DOCUMENT_KEY_PREFIX: &str = "document-";

/// What the site shows at its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShowOnFront {
    /// Latest posts
    #[default]
    Posts,
    /// A static front-page document
    Page,
}

impl fmt::Display for ShowOnFront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => write!(f, "posts"),
            Self::Page => write!(f, "page"),
        }
    }
}

impl FromStr for ShowOnFront {
    type Err = SiteGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "posts" => Ok(Self::Posts),
            "page" => Ok(Self::Page),
            other => Err(SiteGenError::InvalidPayload {
                reason: format!("unknown front page mode '{other}', expected 'posts' or 'page'"),
            }),
        }
    }
}

/// Site options finalize reads and writes.
pub trait SiteSettings: Send + Sync {
    /// Current front-page display mode.
    fn show_on_front(&self) -> Result<ShowOnFront>;

    /// Change the front-page display mode.
    fn set_show_on_front(&self, mode: ShowOnFront) -> Result<()>;

    /// Designated front-page document, if any.
    fn front_page(&self) -> Result<Option<String>>;

    /// Designate `document_id` as the front page.
    fn set_front_page(&self, document_id: &str) -> Result<()>;

    /// The site title; empty when never set.
    fn site_title(&self) -> Result<String>;

    /// The site url; empty when never set.
    fn site_url(&self) -> Result<String>;
}

/// Publishes documents on the site.
pub trait DocumentPublisher: Send + Sync {
    /// Publish a document and return its id.
    fn publish(
        &self,
        title: &str,
        content: &str,
        no_title_template: bool,
        metadata: &BTreeMap<String, Value>,
    ) -> Result<String>;

    /// Whether a previously returned id still refers to a document.
    fn exists(&self, document_id: &str) -> Result<bool>;
}

/// A published document as [`StoreSite`] records it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `document-<uuid>`
    pub id: String,
    /// Document title
    pub title: String,
    /// Block markup body
    pub content: String,
    /// Render without the title template
    #[serde(default)]
    pub no_title_template: bool,
    /// Arbitrary metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Publication time
    pub published_at: DateTime<Utc>,
}

/// [`SiteSettings`] and [`DocumentPublisher`] backed by the session store.
#[derive(Clone)]
pub struct StoreSite {
    store: Arc<dyn SessionStore>,
}

impl StoreSite {
    /// Wrap a session store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
        }
    }

    /// Set the site title.
    pub fn set_site_title(&self, title: &str) -> Result<()> {
        self.set_option(BLOGNAME, &title)
    }

    /// Set the site url.
    pub fn set_site_url(&self, url: &str) -> Result<()> {
        self.set_option(SITEURL, &url)
    }

    /// Read a published document.
    pub fn document(&self, document_id: &str) -> Result<Option<Document>> {
        if !document_id.starts_with(DOCUMENT_KEY_PREFIX) {
            return Ok(None);
        }
        Ok(load_optional::<Document>(self.store.as_ref(), document_id)?.value)
    }

    fn option<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        Ok(load_optional::<T>(self.store.as_ref(), name)?.value)
    }

    fn set_option<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let version = self.store.get(name)?.map_or(0, |r| r.version);
        let mut tx = Transaction::new();
        tx.put(name, version, value)?;
        tx.commit(self.store.as_ref())?;
        debug!(option = name, "Site option updated");
        Ok(())
    }
}

impl SiteSettings for StoreSite {
    fn show_on_front(&self) -> Result<ShowOnFront> {
        Ok(self.option(SHOW_ON_FRONT)?.unwrap_or_default())
    }

    fn set_show_on_front(&self, mode: ShowOnFront) -> Result<()> {
        self.set_option(SHOW_ON_FRONT, &mode)
    }

    fn front_page(&self) -> Result<Option<String>> {
        self.option(PAGE_ON_FRONT)
    }

    fn set_front_page(&self, document_id: &str) -> Result<()> {
        self.set_option(PAGE_ON_FRONT, &document_id)
    }

    fn site_title(&self) -> Result<String> {
        Ok(self.option(BLOGNAME)?.unwrap_or_default())
    }

    fn site_url(&self) -> Result<String> {
        Ok(self.option(SITEURL)?.unwrap_or_default())
    }
}

impl DocumentPublisher for StoreSite {
    fn publish(
        &self,
        title: &str,
        content: &str,
        no_title_template: bool,
        metadata: &BTreeMap<String, Value>,
    ) -> Result<String> {
        let document = Document {
            id: format!("{DOCUMENT_KEY_PREFIX}{}", uuid::Uuid::new_v4()),
            title: title.to_string(),
            content: content.to_string(),
            no_title_template,
            metadata: metadata.clone(),
            published_at: Utc::now(),
        };

        let mut tx = Transaction::new();
        tx.put(&document.id, 0, &document)?;
        tx.commit(self.store.as_ref()).map_err(|e| SiteGenError::PublishFailed {
            title: title.to_string(),
            reason: e.to_string(),
        })?;

        info!(id = %document.id, title, "Published document");
        Ok(document.id)
    }

    fn exists(&self, document_id: &str) -> Result<bool> {
        Ok(self.document(document_id)?.is_some())
    }
}
