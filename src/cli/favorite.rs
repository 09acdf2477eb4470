//! `favorite` and `duplicate`.

use super::SessionContext;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Toggle the favorite flag of a homepage.
#[derive(Args, Debug)]
pub struct FavoriteCommand {
    /// Slug of the homepage, e.g. `version2`
    slug: String,
}

impl FavoriteCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let variant = ctx.homepages()?.toggle_favorite(&self.slug).await?;
        if variant.is_favorite {
            println!("{} {} is a favorite", "★".yellow(), variant.title.bold());
        } else {
            println!("{} is no longer a favorite", variant.title.bold());
        }
        Ok(())
    }
}

/// Copy a homepage with a different palette.
#[derive(Args, Debug)]
pub struct DuplicateCommand {
    /// Slug of the homepage to copy
    slug: String,
}

impl DuplicateCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;

        let spinner = ctx.spinner("Picking a palette");
        let copy = service.duplicate_favorite(&self.slug, None).await;
        spinner.finish_and_clear();
        let copy = copy?;

        println!(
            "{} Added {} ({}) with {}",
            "✓".green(),
            copy.title.bold(),
            copy.slug,
            copy.color.slug
        );
        Ok(())
    }
}
