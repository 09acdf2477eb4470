//! sitegen - homepage generation and theming for site onboarding
//!
//! During onboarding a site owner describes their site once. sitegen turns
//! that description into a set of AI-generated homepage variants, each with
//! its own color palette, lets the owner favorite, duplicate and regenerate
//! them, and finally publishes the chosen homepage together with a child
//! theme carrying its palette.
//!
//! # Architecture Overview
//!
//! All session state lives in a versioned key-value [`store`]. Every
//! read-modify-write loads records with their versions and commits a batch
//! of compare-and-set writes, retrying on conflict. Two requests racing on
//! the same session therefore never lose each other's variants.
//!
//! ```text
//!   prompt ──► palette ──► homepages ──► finalize ──► site + theme
//!                 │            │             │
//!                 └── backend ─┘             └── checkpoint in store
//! ```
//!
//! # Core Modules
//!
//! ## Session state
//! - [`store`] - Versioned records, atomic batch commits, conflict retry
//! - [`models`] - Variants, palettes and the session prompt
//!
//! ## Generation
//! - [`backend`] - The remote generation API and its payload parsing
//! - [`palette`] - Raw palette normalization and the cached candidate set
//! - [`homepages`] - Generate, regenerate, favorite and duplicate variants
//!
//! ## Publishing
//! - [`site`] - Site options and document publishing
//! - [`theme`] - Theme hosting and child theme generation
//! - [`finalize`] - The resumable publish, theme, activate sequence
//!
//! ## Supporting Modules
//! - [`cli`] - The `sitegen` command line
//! - [`config`] - `~/.sitegen/config.toml`
//! - [`core`] - Error types and user-facing error reporting
//! - [`constants`] - Store keys, retry parameters and defaults
//! - [`utils`] - Atomic file writes, spinners and slugs
//!
//! # Session Keys
//!
//! | Key | Contents |
//! |-----|----------|
//! | `sitegen-prompt` | site description, content style, target audience |
//! | `sitegen-homepages` | the variant set in display order |
//! | `sitegen-regenerate-homepages` | pre-generated variants not yet shown |
//! | `sitegen-colorpalette` | palette candidates for the current prompt |
//! | `sitegen-finalize-<child theme>` | finalize progress |
//!
//! # Example
//!
//! ```rust,no_run
//! use sitegen_onboarding::backend::HttpBackend;
//! use sitegen_onboarding::homepages::HomepageService;
//! use sitegen_onboarding::models::SitePrompt;
//! use sitegen_onboarding::store::FileStore;
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = FileStore::open(Path::new("/tmp/sitegen"), "default")?;
//! let backend = HttpBackend::new("https://api.example.com/", None, Duration::from_secs(60))?;
//! let service = HomepageService::new(Arc::new(store), Arc::new(backend));
//!
//! let prompt = SitePrompt::new("A family bakery in Lisbon", "warm", "locals");
//! service.set_prompt(&prompt).await?;
//! for variant in service.generate(&prompt, false).await? {
//!     println!("{} uses {}", variant.title, variant.color.slug);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod finalize;
pub mod homepages;
pub mod models;
pub mod palette;
pub mod site;
pub mod store;
pub mod theme;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
