//! Themes: the host abstraction and child theme generation.
//!
//! Finalize never touches the filesystem directly. It goes through a
//! [`ThemeHost`], which answers where a theme lives, which theme is active,
//! and performs the handful of file operations child theme generation needs.
//! [`LocalThemes`] implements it over a plain themes directory:
//!
//! ```text
//! <themes>/
//! ├── .active-theme          # slug of the active theme
//! ├── yith-wonder/           # parent theme
//! │   ├── style.css
//! │   ├── theme.json
//! │   └── screenshot.png
//! └── yith-wonder-version2/  # generated child theme
//!     ├── theme.json
//!     ├── parts/header.html
//!     ├── style.css
//!     └── screenshot.png
//! ```

mod child;
mod stylesheet;

pub use child::{ChildThemeSpec, child_theme_slug, generate_child_theme, write_child_theme};
pub use stylesheet::{StylesheetContext, render_stylesheet, site_title_or_fallback, site_url_hash};

use crate::core::{Result, SiteGenError};
use crate::utils::{atomic_write, ensure_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const ACTIVE_THEME_FILE: &str = ".active-theme";

/// Theme lookup, activation and file capabilities.
pub trait ThemeHost: Send + Sync {
    /// Directory of the theme `slug`, whether or not it exists.
    fn theme_dir(&self, slug: &str) -> PathBuf;

    /// Whether the theme `slug` is installed.
    fn theme_exists(&self, slug: &str) -> bool;

    /// The active theme, if any.
    fn active_theme(&self) -> Result<Option<String>>;

    /// Make `slug` the active theme.
    fn activate(&self, slug: &str) -> Result<()>;

    /// Create `path` and its parents.
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace a file's contents.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Copy a file, replacing the destination.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

/// [`ThemeHost`] over a local themes directory.
#[derive(Debug, Clone)]
pub struct LocalThemes {
    root: PathBuf,
}

impl LocalThemes {
    /// Use `root` as the themes directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The themes directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn fs_error(e: &anyhow::Error) -> SiteGenError {
    SiteGenError::Other {
        message: format!("{e:#}"),
    }
}

impl ThemeHost for LocalThemes {
    fn theme_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    fn theme_exists(&self, slug: &str) -> bool {
        !slug.is_empty() && self.theme_dir(slug).is_dir()
    }

    fn active_theme(&self) -> Result<Option<String>> {
        let path = self.root.join(ACTIVE_THEME_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let slug = fs::read_to_string(&path)?.trim().to_string();
        Ok((!slug.is_empty()).then_some(slug))
    }

    fn activate(&self, slug: &str) -> Result<()> {
        if !self.theme_exists(slug) {
            return Err(SiteGenError::not_found(format!("theme '{slug}'")));
        }
        atomic_write(&self.root.join(ACTIVE_THEME_FILE), slug.as_bytes())
            .map_err(|e| fs_error(&e))?;
        info!(theme = slug, "Activated theme");
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        ensure_dir(path).map_err(|e| fs_error(&e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        atomic_write(path, content).map_err(|e| fs_error(&e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if to.exists() {
            fs::remove_file(to)?;
        }
        fs::copy(from, to)?;
        Ok(())
    }
}
