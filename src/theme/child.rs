use super::ThemeHost;
use super::stylesheet::{StylesheetContext, render_stylesheet, site_title_or_fallback};
use crate::config::SiteConfig;
use crate::core::{Result, SiteGenError};
use crate::models::{ColorPalette, HomepageVariant};
use crate::site::SiteSettings;
use crate::utils::sanitize_slug;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

const SCREENSHOT_FILES: [&str; 2] = ["screenshot.png", "screenshot.jpg"];

/// Everything needed to write one child theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildThemeSpec {
    /// Parent theme slug
    pub parent_slug: String,
    /// `<parent>-<variant slug>`
    pub child_slug: String,
    /// Parent theme directory
    pub parent_dir: PathBuf,
    /// Child theme directory, beside the parent's
    pub child_dir: PathBuf,
    /// Parent design tokens with the variant's palette merged in
    pub theme_json: Value,
    /// Template parts by name (`header`, `footer`); empty parts are omitted
    pub parts: BTreeMap<String, String>,
    /// Rendered `style.css`
    pub stylesheet: String,
    /// Base64 screenshot; the parent's screenshot is copied when absent
    pub screenshot: Option<String>,
}

/// Child theme slug for a variant.
#[must_use]
pub fn child_theme_slug(parent_slug: &str, variant_slug: &str) -> String {
    format!("{parent_slug}-{}", sanitize_slug(variant_slug))
}

/// Derive a child theme from the configured parent and write it.
///
/// The parent must be installed, and is activated first if another theme is
/// active. Fails with [`SiteGenError::ThemeConfigMissing`] when the parent's
/// `theme.json` cannot be read, or [`SiteGenError::WriteFailed`] naming the
/// first write step that failed.
pub fn generate_child_theme(
    host: &dyn ThemeHost,
    settings: &dyn SiteSettings,
    site: &SiteConfig,
    variant: &HomepageVariant,
    screenshot: Option<&str>,
) -> Result<ChildThemeSpec> {
    let parent_slug = site.parent_theme.as_str();
    if !host.theme_exists(parent_slug) {
        return Err(SiteGenError::ParentThemeMissing {
            slug: parent_slug.to_string(),
        });
    }

    if host.active_theme()?.as_deref() != Some(parent_slug) {
        debug!(parent = parent_slug, "Activating parent theme to expose its template parts");
        host.activate(parent_slug)?;
    }

    let child_slug = child_theme_slug(parent_slug, &variant.slug);
    let parent_dir = host.theme_dir(parent_slug);
    let child_dir = host.theme_dir(&child_slug);

    let theme_json_path = parent_dir.join("theme.json");
    let mut theme_json = host
        .read(&theme_json_path)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .filter(Value::is_object)
        .ok_or_else(|| SiteGenError::ThemeConfigMissing {
            path: theme_json_path.display().to_string(),
        })?;
    apply_palette(&mut theme_json, &variant.color);

    let site_url = settings.site_url()?;
    let site_title = site_title_or_fallback(site, &settings.site_title()?, &site_url);
    let stylesheet = render_stylesheet(&StylesheetContext {
        brand: site.brand.clone(),
        theme_name: variant.title.clone(),
        site_title,
        site_url,
        author: site.author.clone(),
        author_uri: site.author_uri.clone(),
        parent_slug: parent_slug.to_string(),
        child_slug: child_slug.clone(),
    })?;

    let parts = [("header", &variant.header), ("footer", &variant.footer)]
        .into_iter()
        .filter_map(|(name, markup)| {
            markup
                .as_ref()
                .filter(|m| !m.trim().is_empty())
                .map(|m| (name.to_string(), m.clone()))
        })
        .collect();

    let spec = ChildThemeSpec {
        parent_slug: parent_slug.to_string(),
        child_slug,
        parent_dir,
        child_dir,
        theme_json,
        parts,
        stylesheet,
        screenshot: screenshot.map(str::to_string),
    };
    write_child_theme(host, &spec)?;
    Ok(spec)
}

/// Replace `settings.color.palette` with the palette entries.
fn apply_palette(theme_json: &mut Value, palette: &ColorPalette) {
    let entries: Vec<Value> = palette
        .entries
        .iter()
        .map(|e| json!({"slug": e.slug, "name": e.title, "color": e.color}))
        .collect();

    let settings = object_entry(theme_json, "settings");
    let color = object_entry(settings, "color");
    if let Value::Object(color) = color {
        color.insert("palette".to_string(), Value::Array(entries));
    }
}

/// The object at `key`, replacing whatever non-object was there.
fn object_entry<'a>(value: &'a mut Value, key: &str) -> &'a mut Value {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => {
            let entry = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            entry
        }
        other => other,
    }
}

/// Write a child theme in order: directory, `theme.json`, template parts,
/// `style.css`, screenshot. Stops at the first failure.
pub fn write_child_theme(host: &dyn ThemeHost, spec: &ChildThemeSpec) -> Result<()> {
    let dir = &spec.child_dir;

    if !host.exists(dir) {
        host.create_dir(dir).map_err(|e| SiteGenError::write_failed("child directory", e))?;
    }

    let theme_json = serde_json::to_vec_pretty(&spec.theme_json)?;
    host.write(&dir.join("theme.json"), &theme_json)
        .map_err(|e| SiteGenError::write_failed("theme.json", e))?;

    if !spec.parts.is_empty() {
        let parts_dir = dir.join("parts");
        if !host.exists(&parts_dir) {
            host.create_dir(&parts_dir).map_err(|e| SiteGenError::write_failed("template part", e))?;
        }
        for (part, markup) in &spec.parts {
            host.write(&parts_dir.join(format!("{part}.html")), markup.as_bytes())
                .map_err(|e| SiteGenError::write_failed("template part", e))?;
        }
    }

    host.write(&dir.join("style.css"), spec.stylesheet.as_bytes())
        .map_err(|e| SiteGenError::write_failed("stylesheet", e))?;

    write_screenshot(host, spec).map_err(|e| SiteGenError::write_failed("screenshot", e))?;

    info!(child = %spec.child_slug, dir = %dir.display(), "Child theme written");
    Ok(())
}

fn write_screenshot(host: &dyn ThemeHost, spec: &ChildThemeSpec) -> Result<()> {
    if let Some(encoded) = &spec.screenshot {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| SiteGenError::InvalidPayload {
            reason: format!("screenshot is not valid base64: {e}"),
        })?;
        return host.write(&spec.child_dir.join(SCREENSHOT_FILES[0]), &bytes);
    }

    let file = SCREENSHOT_FILES
        .iter()
        .find(|name| host.exists(&spec.parent_dir.join(name)))
        .ok_or_else(|| SiteGenError::not_found(format!("screenshot of '{}'", spec.parent_slug)))?;
    host.copy(&spec.parent_dir.join(file), &spec.child_dir.join(file))
}
