//! `palettes`, `generate` and `regenerate`: the commands that call the backend.

use super::SessionContext;
use super::list::render_table;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Show the palette candidates, fetching them on first use.
#[derive(Args, Debug)]
pub struct PalettesCommand {}

impl PalettesCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;
        let spinner = ctx.spinner("Fetching color palettes");
        let palettes = service.palettes().await;
        spinner.finish_and_clear();

        for (index, palette) in palettes?.iter().enumerate() {
            println!("{}", format!("palette{}", index + 1).bold());
            for (name, color) in palette.pairs() {
                println!("  {name:<20} {color}");
            }
        }
        Ok(())
    }
}

/// Generate homepage variants from the session prompt.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Add a batch to the regeneration buffer instead of replacing the set
    #[arg(long)]
    more: bool,
}

impl GenerateCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;
        let prompt = service.prompt()?;

        let spinner = ctx.spinner("Generating homepages");
        let batch = service.generate(&prompt, self.more).await;
        spinner.finish_and_clear();
        let batch = batch?;

        if self.more {
            println!("{} Buffered {} more homepages", "✓".green(), batch.len());
        } else {
            println!("{} Generated {} homepages", "✓".green(), batch.len());
            print!("{}", render_table(&batch));
        }
        Ok(())
    }
}

/// Append one variant, from the buffer when it has one.
#[derive(Args, Debug)]
pub struct RegenerateCommand {}

impl RegenerateCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;
        let prompt = service.prompt()?;

        let spinner = ctx.spinner("Generating a homepage");
        let variant = service.regenerate_one(&prompt).await;
        spinner.finish_and_clear();
        let variant = variant?;

        println!("{} Added {} ({})", "✓".green(), variant.title.bold(), variant.slug);
        Ok(())
    }
}
