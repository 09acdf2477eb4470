//! Shared data models for the homepage generation pipeline.
//!
//! These are the records persisted in the session store and exchanged
//! between the generator, the favorites manager and the finalizer.

use serde::{Deserialize, Serialize};

/// One entry of a display-ready color palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Machine name of the color (e.g. `header_background`)
    pub slug: String,
    /// Humanized form of the slug (e.g. `Header background`)
    pub title: String,
    /// Hex or CSS color string
    pub color: String,
}

/// A color palette assigned to a homepage variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// `palette<N>`, 1-based index into the candidate set it was drawn from
    pub slug: String,
    /// Entries in the raw palette's key order
    pub entries: Vec<PaletteEntry>,
}

impl ColorPalette {
    /// Structural comparison of the colors only, ignoring which candidate
    /// index the palette came from.
    #[must_use]
    pub fn same_colors(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// A candidate homepage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageVariant {
    /// Unique within the persisted set: `version<N>` or a `-copy` derivative
    pub slug: String,
    /// Display title, e.g. `Version 3`
    pub title: String,
    /// Block markup of the page body
    pub content: String,
    /// Optional header template part markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Optional footer template part markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Palette assigned to this variant
    pub color: ColorPalette,
    /// User-marked favorite
    #[serde(default)]
    pub is_favorite: bool,
}

/// The prompt context gathered by the guided flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePrompt {
    /// Free-text description of the site
    pub site_description: String,
    /// Content style (tone) chosen or generated earlier in the flow
    #[serde(default)]
    pub content_style: String,
    /// Target audience chosen or generated earlier in the flow
    #[serde(default)]
    pub target_audience: String,
}

impl SitePrompt {
    /// Create a prompt from its three parts.
    pub fn new(
        site_description: impl Into<String>,
        content_style: impl Into<String>,
        target_audience: impl Into<String>,
    ) -> Self {
        Self {
            site_description: site_description.into(),
            content_style: content_style.into(),
            target_audience: target_audience.into(),
        }
    }
}
