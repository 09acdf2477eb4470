//! The `style.css` header of generated child themes.

use crate::config::SiteConfig;
use crate::constants::SITE_URL_HASH_LENGTH;
use crate::core::{Result, SiteGenError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tera::{Context as TeraContext, Tera};
use tracing::warn;

const STYLESHEET_TEMPLATE: &str = r"/*
Theme Name: {{ theme_name }}
Theme URI: {{ site_url }}
Author: {{ author }}
Author URI: {{ author_uri }}
Description: {{ brand }} theme generated for {{ site_title }}
Template: {{ parent_slug }}
Text Domain: {{ child_slug }}
Version: 1.0.0
*/
";

/// Values substituted into the stylesheet header.
#[derive(Debug, Clone, Serialize)]
pub struct StylesheetContext {
    /// Brand name
    pub brand: String,
    /// Theme name (the variant title)
    pub theme_name: String,
    /// Site title, already passed through [`site_title_or_fallback`]
    pub site_title: String,
    /// Site url
    pub site_url: String,
    /// Theme author
    pub author: String,
    /// Theme author url
    pub author_uri: String,
    /// Parent theme slug
    pub parent_slug: String,
    /// Child theme slug
    pub child_slug: String,
}

/// Render the stylesheet header.
pub fn render_stylesheet(context: &StylesheetContext) -> Result<String> {
    let context = TeraContext::from_serialize(context).map_err(|e| SiteGenError::Other {
        message: format!("Failed to build stylesheet context: {e}"),
    })?;

    let mut tera = Tera::default();
    tera.render_str(STYLESHEET_TEMPLATE, &context).map_err(|e| SiteGenError::Other {
        message: format!("Failed to render stylesheet: {e}"),
    })
}

/// First [`SITE_URL_HASH_LENGTH`] hex characters of SHA-256 of `site_url`.
#[must_use]
pub fn site_url_hash(site_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(site_url.as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(SITE_URL_HASH_LENGTH);
    hash
}

/// The site title, or `<brand>-<site url hash>` when the title was never customised.
#[must_use]
pub fn site_title_or_fallback(site: &SiteConfig, title: &str, site_url: &str) -> String {
    if site.is_placeholder_title(title) {
        let fallback = format!("{}-{}", site.brand, site_url_hash(site_url));
        warn!(title, fallback = %fallback, "Site title is a placeholder, synthesizing one");
        fallback
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_hash() {
        // sha256("https://example.com") = 100680ad546ce6a577f42f52df33b4cfdca756859e664b8d7de329b150d09ce9
        assert_eq!(site_url_hash("https://example.com"), "100680ad");
        assert_eq!(site_url_hash("").len(), 8);
    }

    #[test]
    fn test_fallback_only_for_placeholders() {
        let site = SiteConfig::default();

        assert_eq!(
            site_title_or_fallback(&site, "My WordPress Site", "https://example.com"),
            "bluehost-100680ad"
        );
        assert_eq!(site_title_or_fallback(&site, "", "https://example.com"), "bluehost-100680ad");
        assert_eq!(site_title_or_fallback(&site, "Pastelaria", "https://example.com"), "Pastelaria");
    }

    #[test]
    fn test_render_stylesheet() {
        let css = render_stylesheet(&StylesheetContext {
            brand: "bluehost".to_string(),
            theme_name: "Version 2".to_string(),
            site_title: "Pastelaria & Co".to_string(),
            site_url: "https://pastelaria.example".to_string(),
            author: "Bluehost".to_string(),
            author_uri: "https://www.bluehost.com".to_string(),
            parent_slug: "yith-wonder".to_string(),
            child_slug: "yith-wonder-version2".to_string(),
        })
        .unwrap();

        assert!(css.starts_with("/*\nTheme Name: Version 2\n"));
        assert!(css.contains("Template: yith-wonder\n"));
        assert!(css.contains("Text Domain: yith-wonder-version2\n"));
        assert!(css.contains("generated for Pastelaria & Co\n"));
        assert!(css.trim_end().ends_with("*/"));
    }
}
