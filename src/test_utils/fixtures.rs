//! Sample prompts, palettes, variants and themes for tests.

use crate::models::{HomepageVariant, SitePrompt};
use crate::palette::{RawPalette, transform};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

/// A complete session prompt.
pub fn prompt() -> SitePrompt {
    SitePrompt::new("A family bakery in Lisbon selling pastel de nata", "warm", "locals and tourists")
}

/// Three distinct palettes, in the backend's response shape.
pub fn palettes_json() -> Value {
    json!([
        {
            "base": "#F0F0F0",
            "contrast": "#333333",
            "primary": "#09728C",
            "header_background": "#09728C"
        },
        {
            "base": "#EAE2D6",
            "contrast": "#2E2E2E",
            "primary": "#D19858",
            "header_background": "#D19858"
        },
        {
            "base": "#D9E4E7",
            "contrast": "#1B1B1B",
            "primary": "#3C7A89",
            "header_background": "#3C7A89"
        }
    ])
}

/// [`palettes_json`] decoded.
pub fn raw_palettes() -> Vec<RawPalette> {
    serde_json::from_value(palettes_json()).unwrap_or_default()
}

/// Home pages with a null block and a null group, in the backend's response shape.
pub fn home_pages_json() -> Value {
    json!({
        "a": ["<p>X</p>", null],
        "b": ["<p>Y</p>"],
        "c": ["<p>Z</p>"]
    })
}

/// A variant using the first sample palette.
pub fn variant(slug: &str, title: &str) -> HomepageVariant {
    let color = raw_palettes().first().map(|raw| transform(raw, 0)).unwrap_or_else(|| {
        crate::models::ColorPalette {
            slug: "palette1".to_string(),
            entries: Vec::new(),
        }
    });
    HomepageVariant {
        slug: slug.to_string(),
        title: title.to_string(),
        content: format!("<!-- wp:paragraph --><p>{title}</p><!-- /wp:paragraph -->"),
        header: None,
        footer: None,
        color,
        is_favorite: false,
    }
}

/// Install a minimal block theme at `<themes_dir>/<slug>`.
pub fn install_parent_theme(themes_dir: &Path, slug: &str) {
    let dir = themes_dir.join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("style.css"), format!("/*\nTheme Name: {slug}\n*/\n")).unwrap();
    fs::write(
        dir.join("theme.json"),
        serde_json::to_string_pretty(&json!({
            "version": 2,
            "settings": {
                "color": {"palette": [{"slug": "base", "name": "Base", "color": "#ffffff"}]},
                "typography": {"fluid": true}
            }
        }))
        .unwrap(),
    )
    .unwrap();
    fs::write(dir.join("screenshot.png"), b"\x89PNG parent").unwrap();
}
