//! `prompt` and `site`: the inputs gathered before generation.

use super::SessionContext;
use crate::core::SiteGenError;
use crate::models::SitePrompt;
use crate::site::{ShowOnFront, SiteSettings};
use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

/// Set or show the session prompt.
///
/// Any part left out keeps its stored value, so the style can be changed
/// without repeating the description.
#[derive(Args, Debug)]
pub struct PromptCommand {
    /// Free-text description of the site
    description: Option<String>,

    /// Content style, e.g. "warm" or "professional"
    #[arg(long)]
    style: Option<String>,

    /// Target audience
    #[arg(long)]
    audience: Option<String>,
}

impl PromptCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let service = ctx.homepages()?;
        let current = match service.prompt() {
            Ok(prompt) => Some(prompt),
            Err(SiteGenError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        if self.description.is_none() && self.style.is_none() && self.audience.is_none() {
            let Some(prompt) = current else {
                return Err(SiteGenError::not_found("session prompt").into());
            };
            print_prompt(&prompt);
            return Ok(());
        }

        let prompt = merge(current, self.description, self.style, self.audience)?;
        service.set_prompt(&prompt).await?;
        println!("{} Prompt saved", "✓".green());
        print_prompt(&prompt);
        Ok(())
    }
}

fn merge(
    current: Option<SitePrompt>,
    description: Option<String>,
    style: Option<String>,
    audience: Option<String>,
) -> Result<SitePrompt> {
    let base = current.unwrap_or_else(|| SitePrompt::new("", "", ""));
    let prompt = SitePrompt {
        site_description: description.unwrap_or(base.site_description),
        content_style: style.unwrap_or(base.content_style),
        target_audience: audience.unwrap_or(base.target_audience),
    };
    if prompt.site_description.trim().is_empty() {
        bail!("The site description must not be empty");
    }
    Ok(prompt)
}

fn print_prompt(prompt: &SitePrompt) {
    println!("{:<12} {}", "Description:".bold(), prompt.site_description);
    println!("{:<12} {}", "Style:".bold(), prompt.content_style);
    println!("{:<12} {}", "Audience:".bold(), prompt.target_audience);
}

/// Set or show the site options finalize reads.
#[derive(Args, Debug)]
pub struct SiteCommand {
    /// Site title
    #[arg(long)]
    title: Option<String>,

    /// Site url
    #[arg(long)]
    url: Option<String>,

    /// What the site shows at its root
    #[arg(long, value_parser = ["posts", "page"])]
    front_page: Option<String>,
}

impl SiteCommand {
    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        let site = ctx.site();
        // Site option writes wait on the store lock
        let (title, url, front, front_page) = tokio::task::spawn_blocking(move || {
            if let Some(title) = &self.title {
                site.set_site_title(title)?;
            }
            if let Some(url) = &self.url {
                site.set_site_url(url)?;
            }
            if let Some(mode) = &self.front_page {
                site.set_show_on_front(mode.parse::<ShowOnFront>()?)?;
            }
            anyhow::Ok((
                site.site_title()?,
                site.site_url()?,
                site.show_on_front()?,
                site.front_page()?.unwrap_or_else(|| "-".to_string()),
            ))
        })
        .await
        .context("Failed to spawn blocking task for site options")??;

        println!("{:<12} {}", "Title:".bold(), title);
        println!("{:<12} {}", "Url:".bold(), url);
        println!("{:<12} {}", "Front:".bold(), front);
        println!("{:<12} {}", "Front page:".bold(), front_page);
        Ok(())
    }
}
