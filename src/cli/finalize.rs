//! `finalize`: publish the chosen homepage and activate its child theme.

use super::SessionContext;
use crate::finalize::Finalizer;
use crate::site::{DocumentPublisher, SiteSettings};
use crate::theme::ThemeHost;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Publish a homepage and activate its child theme.
///
/// Other favorites are published and themed too, so the user can switch to
/// them later. Rerunning after a failure reuses documents that were already
/// published.
#[derive(Args, Debug)]
pub struct FinalizeCommand {
    /// Slug of the homepage to activate
    slug: String,

    /// Screenshot image for the activated child theme
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,
}

impl FinalizeCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let screenshot = match &self.screenshot {
            Some(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read screenshot {}", path.display()))?;
                Some(STANDARD.encode(bytes))
            }
            None => None,
        };

        let service = ctx.homepages()?;
        let active = service.variant(&self.slug)?;
        let all = service.variants()?;

        let site = Arc::new(ctx.site());
        let settings: Arc<dyn SiteSettings> = site.clone();
        let publisher: Arc<dyn DocumentPublisher> = site;
        let themes: Arc<dyn ThemeHost> = Arc::new(ctx.themes()?);
        let finalizer =
            Finalizer::new(ctx.store(), settings, publisher, themes, ctx.config().site.clone());

        let spinner = ctx.spinner("Publishing homepage");
        // Finalize commits checkpoints through the blocking store lock
        let report = {
            let active = active.clone();
            tokio::task::spawn_blocking(move || {
                finalizer.finalize(&active, &all, screenshot.as_deref())
            })
            .await
            .context("Failed to spawn blocking task for finalize")
        };
        spinner.finish_and_clear();
        let report = report??;

        println!("{} Published {} as the front page", "✓".green(), active.title.bold());
        if report.reused_documents > 0 {
            println!("  reused {} documents from an earlier attempt", report.reused_documents);
        }
        for theme in &report.themes {
            let marker = if *theme == report.child_slug { "active" } else { "" };
            println!("  theme {theme} {}", marker.cyan());
        }
        Ok(())
    }
}
