//! `list`: show the homepage variants of the session.
//!
//! ```text
//! SLUG            TITLE                 PALETTE    FAVORITE
//! version1        Version 1             palette2
//! version2        Version 2             palette1   ★
//! version2-copy   Version 2 (Copy)      palette3
//! ```

use super::SessionContext;
use crate::models::HomepageVariant;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::fmt::Write as _;

/// Output formats for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// The variants as stored, pretty-printed
    Json,
}

/// List homepage variants.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Show the regeneration buffer instead of the variant set
    #[arg(long)]
    buffered: bool,

    /// Only favorites
    #[arg(long)]
    favorites: bool,
}

impl ListCommand {
    pub fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;
        let mut variants = if self.buffered {
            service.buffered()?
        } else {
            service.variants()?
        };
        if self.favorites {
            variants.retain(|v| v.is_favorite);
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&variants)?),
            OutputFormat::Table if variants.is_empty() => {
                println!("No homepages yet. Run 'sitegen generate' first.");
            }
            OutputFormat::Table => print!("{}", render_table(&variants)),
        }
        Ok(())
    }
}

/// Render variants as aligned columns with a header row.
pub(super) fn render_table(variants: &[HomepageVariant]) -> String {
    let slug_width = variants.iter().map(|v| v.slug.len()).max().unwrap_or(0).max(4) + 2;
    let title_width = variants.iter().map(|v| v.title.len()).max().unwrap_or(0).max(5) + 2;
    let palette_width = variants.iter().map(|v| v.color.slug.len()).max().unwrap_or(0).max(7) + 2;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:<slug_width$}{:<title_width$}{:<palette_width$}{}",
            "SLUG", "TITLE", "PALETTE", "FAVORITE"
        )
        .bold()
    );
    for variant in variants {
        let _ = writeln!(
            out,
            "{:<slug_width$}{:<title_width$}{:<palette_width$}{}",
            variant.slug,
            variant.title,
            variant.color.slug,
            if variant.is_favorite { "★" } else { "" }
        );
    }
    out
}
