//! The external content-generation backend.
//!
//! Two calls matter to the homepage pipeline:
//!
//! - [`GenerationBackend::generate_site_meta`] answers an identifier such as
//!   `color_palette` for the session prompt.
//! - [`GenerationBackend::get_home_pages`] returns an ordered mapping of
//!   generation key to block groups.
//!
//! The backend may report failure through an `error` field in an otherwise
//! successful response, so every payload goes through [`check_error_payload`]
//! before it is trusted.

mod http;

pub use http::HttpBackend;

use crate::constants::SITE_META_IDENTIFIERS;
use crate::core::{Result, SiteGenError};
use crate::models::SitePrompt;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Content generated for one homepage candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedHomepage {
    /// Concatenated non-null content blocks
    pub content: String,
    /// Header template part, if the backend produced one
    pub header: Option<String>,
    /// Footer template part, if the backend produced one
    pub footer: Option<String>,
}

/// Home-page generation result in backend key order.
pub type HomepagePayload = Vec<(String, GeneratedHomepage)>;

/// Contract of the generation backend consumed by this crate.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate (or fetch cached) site metadata for `identifier`.
    async fn generate_site_meta(
        &self,
        prompt: &SitePrompt,
        identifier: &str,
        skip_cache: bool,
    ) -> Result<Value>;

    /// Generate home-page candidates. `regenerate` asks for fresh combinations.
    async fn get_home_pages(
        &self,
        site_description: &str,
        content_style: &str,
        target_audience: &str,
        regenerate: bool,
    ) -> Result<HomepagePayload>;
}

/// Whether the backend answers site meta requests for `identifier`.
#[must_use]
pub fn is_identifier(identifier: &str) -> bool {
    SITE_META_IDENTIFIERS.contains(&identifier)
}

/// Fail with [`SiteGenError::GenerationFailed`] when `payload` carries an `error` field.
pub fn check_error_payload(payload: &Value) -> Result<()> {
    match payload.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(SiteGenError::generation(message.clone())),
        Some(other) => Err(SiteGenError::generation(other.to_string())),
    }
}

/// Decode a home-pages payload.
///
/// Each value may be `null` (skipped), an array of nullable blocks, or an
/// object `{content, header, footer}` whose `content` is a string or an
/// array of nullable blocks.
pub fn parse_home_pages(payload: Value) -> Result<HomepagePayload> {
    check_error_payload(&payload)?;

    let Value::Object(map) = payload else {
        return Err(SiteGenError::InvalidPayload {
            reason: "home pages response is not an object".to_string(),
        });
    };

    let mut pages = Vec::with_capacity(map.len());
    for (key, group) in map {
        let page = match group {
            Value::Null => {
                debug!(key = %key, "Skipping null home page entry");
                continue;
            }
            Value::Array(blocks) => GeneratedHomepage {
                content: join_blocks(&key, blocks)?,
                ..GeneratedHomepage::default()
            },
            Value::Object(mut fields) => GeneratedHomepage {
                content: match fields.remove("content") {
                    Some(Value::Array(blocks)) => join_blocks(&key, blocks)?,
                    Some(Value::String(content)) => content,
                    None | Some(Value::Null) => String::new(),
                    Some(other) => {
                        return Err(SiteGenError::InvalidPayload {
                            reason: format!("content of '{key}' is not markup: {other}"),
                        });
                    }
                },
                header: optional_part(fields.remove("header")),
                footer: optional_part(fields.remove("footer")),
            },
            other => {
                return Err(SiteGenError::InvalidPayload {
                    reason: format!("home page '{key}' has an unexpected shape: {other}"),
                });
            }
        };
        pages.push((key, page));
    }
    Ok(pages)
}

fn join_blocks(key: &str, blocks: Vec<Value>) -> Result<String> {
    let mut content = String::new();
    for block in blocks {
        match block {
            Value::Null => {}
            Value::String(markup) => content.push_str(&markup),
            other => {
                return Err(SiteGenError::InvalidPayload {
                    reason: format!("block in '{key}' is not markup: {other}"),
                });
            }
        }
    }
    Ok(content)
}

fn optional_part(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(markup)) if !markup.trim().is_empty() => Some(markup),
        _ => None,
    }
}
