//! Command-line interface for sitegen.
//!
//! The CLI drives one onboarding session at a time. A session is a single
//! store document under the state directory, so commands can be run one by
//! one and pick up where the previous one left off:
//!
//! ```bash
//! sitegen prompt "A family bakery in Lisbon" --style warm --audience locals
//! sitegen generate                 # Version 1..N
//! sitegen regenerate               # one more variant
//! sitegen favorite version2
//! sitegen duplicate version2       # "Version 2 (Copy)" with another palette
//! sitegen list --format json
//! sitegen finalize version2 --screenshot shot.png
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet`: debug logging, or none at all
//! - `--config`: configuration file (also `SITEGEN_CONFIG`)
//! - `--session`: session name (also `SITEGEN_SESSION`, default `default`)
//! - `--no-progress`: never draw spinners
//!
//! Logs go to stderr and `RUST_LOG` overrides the level chosen by the flags.
//! Command output goes to stdout.

mod context;
mod favorite;
mod finalize;
mod generate;
mod list;
mod prompt;


pub use context::SessionContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Session used when neither `--session` nor `SITEGEN_SESSION` is given.
pub const DEFAULT_SESSION: &str = "default";

/// Settings derived from the global flags, shared by every command.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Log level, or `None` for no logging at all
    pub log_level: Option<String>,
    /// Disable spinners
    pub no_progress: bool,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Session name
    pub session: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            no_progress: false,
            config_path: None,
            session: DEFAULT_SESSION.to_string(),
        }
    }
}

impl CliConfig {
    /// Install the stderr log subscriber.
    ///
    /// `RUST_LOG` wins over the flags. Calling this twice is harmless.
    pub fn init_logging(&self) {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => match &self.log_level {
                Some(level) => EnvFilter::new(format!("sitegen_onboarding={level},sitegen={level}")),
                None => return,
            },
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Homepage generation and theming for site onboarding.
#[derive(Parser)]
#[command(
    name = "sitegen",
    about = "Generate homepage variants and child themes for a new site",
    version,
    long_about = "sitegen generates homepage variants from a site description, lets you pick \
                  favorites, and publishes the chosen homepage with a matching child theme."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default `~/.sitegen/config.toml`).
    #[arg(short, long, global = true, env = "SITEGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Onboarding session to operate on.
    #[arg(short, long, global = true, env = "SITEGEN_SESSION", default_value = DEFAULT_SESSION)]
    session: String,

    /// Never draw spinners.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set or show the site description, content style and audience
    Prompt(prompt::PromptCommand),

    /// Set or show the site title, url and front page mode
    Site(prompt::SiteCommand),

    /// Show the palette candidates for the session
    Palettes(generate::PalettesCommand),

    /// Generate a fresh set of homepage variants
    Generate(generate::GenerateCommand),

    /// Add one more homepage variant
    Regenerate(generate::RegenerateCommand),

    /// Toggle the favorite flag of a homepage
    Favorite(favorite::FavoriteCommand),

    /// Copy a homepage with a different palette
    Duplicate(favorite::DuplicateCommand),

    /// List the homepage variants
    List(list::ListCommand),

    /// Publish a homepage and activate its child theme
    Finalize(finalize::FinalizeCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
            session: self.session.clone(),
        }
    }

    /// Run the parsed command with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let ctx = SessionContext::open(&config).await?;

        match self.command {
            Commands::Prompt(cmd) => cmd.execute(&ctx).await,
            Commands::Site(cmd) => cmd.execute(&ctx).await,
            Commands::Palettes(cmd) => cmd.execute(&ctx).await,
            Commands::Generate(cmd) => cmd.execute(&ctx).await,
            Commands::Regenerate(cmd) => cmd.execute(&ctx).await,
            Commands::Favorite(cmd) => cmd.execute(&ctx).await,
            Commands::Duplicate(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx),
            Commands::Finalize(cmd) => cmd.execute(&ctx).await,
        }
    }
}
