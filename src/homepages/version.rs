//! Version numbering for generated homepages.
//!
//! Only slugs of the exact form `version<N>` count. Copies such as
//! `version3-copy` never match, so duplicating a variant cannot shift the
//! numbering. The next version is the highest matched number plus one, which
//! stays stable when earlier versions are missing from the set.

use regex::Regex;
use std::sync::OnceLock;

fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^version(\d+)$").ok()).as_ref()
}

/// The version number encoded in `slug`, if it is a plain `version<N>` slug.
#[must_use]
pub fn version_number(slug: &str) -> Option<u32> {
    version_pattern()?.captures(slug)?.get(1)?.as_str().parse().ok()
}

/// `max(version numbers) + 1`, or 1 when nothing matches.
pub fn next_version<'a, I>(slugs: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    slugs.into_iter().filter_map(version_number).max().map_or(1, |max| max.saturating_add(1))
}

/// Slug for version `n`.
#[must_use]
pub fn version_slug(n: u32) -> String {
    format!("version{n}")
}

/// Display title for version `n`.
#[must_use]
pub fn version_title(n: u32) -> String {
    format!("Version {n}")
}
