//! Global constants used throughout the crate.
//!
//! Store keys, retry parameters and theme defaults live here so that the
//! CLI, the services and the tests agree on them.

use std::time::Duration;

/// Store key of the session prompt (site description, content style, audience).
pub const PROMPT_KEY: &str = "sitegen-prompt";

/// Store key of the canonical homepage variant set.
pub const HOMEPAGES_KEY: &str = "sitegen-homepages";

/// Store key of the regeneration buffer.
pub const REGENERATE_BUFFER_KEY: &str = "sitegen-regenerate-homepages";

/// Store key of the cached palette candidate set.
pub const PALETTE_CACHE_KEY: &str = "sitegen-colorpalette";

/// Prefix of per-child-theme finalize checkpoints.
pub const FINALIZE_KEY_PREFIX: &str = "sitegen-finalize-";

/// Backend identifier used to request palette candidates.
pub const COLOR_PALETTE_IDENTIFIER: &str = "color_palette";

/// Site meta identifiers the generation backend answers.
pub const SITE_META_IDENTIFIERS: &[&str] = &[
    "site_classification",
    "target_audience",
    "content_tones",
    "content_structure",
    COLOR_PALETTE_IDENTIFIER,
    "sitemap",
    "plugin_recommendation",
    "font_pair",
];

/// Metadata key marking a published document as a generated homepage.
pub const HOMEPAGE_META_KEY: &str = "nfd_is_homepage";

/// Maximum number of attempts for an optimistic read-modify-write.
pub const MAX_STORE_ATTEMPTS: usize = 5;

/// Maximum backoff delay between store retries (500ms).
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for exponential backoff (10ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Timeout for acquiring the file store lock.
pub const STORE_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for generation backend calls (60 seconds, matching the backend's own).
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 60;

/// Default parent theme for generated child themes.
pub const DEFAULT_PARENT_THEME: &str = "yith-wonder";

/// Default brand embedded in generated stylesheets.
pub const DEFAULT_BRAND: &str = "bluehost";

/// Site titles that count as "not customised" when naming a child theme.
pub const DEFAULT_PLACEHOLDER_TITLES: &[&str] =
    &["", "My WordPress Site", "My WordPress Blog", "WordPress"];

/// Length of the site-url hash used in synthesized site titles.
pub const SITE_URL_HASH_LENGTH: usize = 8;
