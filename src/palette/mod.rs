//! Color palettes: normalizing raw palettes and sourcing candidates.
//!
//! The generation backend answers the `color_palette` identifier with a list
//! of raw palettes, each an ordered `name -> color` mapping. The list is the
//! session's [`PaletteCandidateSet`]. A batch is dealt palettes with
//! [`pick_batch`], a duplicate gets one with [`pick_different`], and both run
//! [`transform`] to get a display-ready [`ColorPalette`].

mod source;

pub use source::{PaletteCandidateSet, PaletteSource};

use crate::core::{Result, SiteGenError};
use crate::models::{ColorPalette, PaletteEntry};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw palette as returned by the backend, in its original key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RawPalette(Vec<(String, String)>);

impl RawPalette {
    /// Build a raw palette from ordered `(name, color)` pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// The `(name, color)` pairs in key order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl TryFrom<Map<String, Value>> for RawPalette {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        map.into_iter()
            .map(|(name, value)| match value {
                Value::String(color) => Ok((name, color)),
                other => Err(format!("palette color '{name}' is not a string: {other}")),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<RawPalette> for Map<String, Value> {
    fn from(palette: RawPalette) -> Self {
        palette.0.into_iter().map(|(name, color)| (name, Value::String(color))).collect()
    }
}

/// Normalize `raw` into a display-ready palette.
///
/// The palette slug is `palette<index + 1>`; entries keep the raw key order.
#[must_use]
pub fn transform(raw: &RawPalette, index: usize) -> ColorPalette {
    ColorPalette {
        slug: format!("palette{}", index + 1),
        entries: raw
            .pairs()
            .iter()
            .map(|(name, color)| PaletteEntry {
                slug: name.clone(),
                title: humanize(name),
                color: color.clone(),
            })
            .collect(),
    }
}

/// `header_background` becomes `Header background`.
#[must_use]
pub fn humanize(slug: &str) -> String {
    let spaced = slug.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Draw `count` palettes for one batch.
///
/// Candidates are dealt from a shuffled deck, so no palette repeats until
/// every candidate has been used once; a larger batch reshuffles and deals
/// again.
pub fn pick_batch<R: Rng + ?Sized>(
    candidates: &[RawPalette],
    count: usize,
    rng: &mut R,
) -> Result<Vec<ColorPalette>> {
    if candidates.is_empty() {
        return Err(SiteGenError::generation("the palette candidate set is empty"));
    }

    let mut picked = Vec::with_capacity(count);
    let mut deck: Vec<usize> = Vec::new();
    while picked.len() < count {
        if deck.is_empty() {
            deck = (0..candidates.len()).collect();
            deck.shuffle(rng);
        }
        if let Some(index) = deck.pop() {
            picked.push(transform(&candidates[index], index));
        }
    }
    Ok(picked)
}

/// Draw a candidate whose colors differ from `exclude`.
///
/// Candidates are drawn without replacement, so the loop ends after at most
/// `candidates.len()` draws. When every candidate matches `exclude` (or there
/// is only one), the first draw is returned.
pub fn pick_different<R: Rng + ?Sized>(
    candidates: &[RawPalette],
    exclude: &ColorPalette,
    rng: &mut R,
) -> Result<ColorPalette> {
    if candidates.is_empty() {
        return Err(SiteGenError::generation("the palette candidate set is empty"));
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.shuffle(rng);

    let first = transform(&candidates[order[0]], order[0]);
    if candidates.len() == 1 {
        return Ok(first);
    }

    for &index in &order {
        let palette = transform(&candidates[index], index);
        if !palette.same_colors(exclude) {
            return Ok(palette);
        }
    }

    tracing::warn!(
        exclude = %exclude.slug,
        candidates = candidates.len(),
        "Every palette candidate matches the excluded palette"
    );
    Ok(first)
}
