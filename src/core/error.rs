//! Error handling for the onboarding site generator
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`SiteGenError`]) for every failure a core
//!    operation can report, so callers can branch on the failure kind.
//! 2. **User-friendly messages** ([`ErrorContext`]) with a suggestion and
//!    details for CLI users.
//!
//! # Error Categories
//!
//! - **Lookup**: [`SiteGenError::NotFound`] for missing variants, prompts or
//!   session context. Never retried automatically.
//! - **Generation**: [`SiteGenError::GenerationFailed`] when the generation
//!   backend returns an error payload or a non-success status. Persisted
//!   state from before the call stays valid, so callers may retry.
//! - **Finalize**: [`SiteGenError::ParentThemeMissing`],
//!   [`SiteGenError::ThemeConfigMissing`], [`SiteGenError::WriteFailed`] and
//!   [`SiteGenError::PublishFailed`] abort the remaining finalize steps.
//! - **Store**: [`SiteGenError::StoreConflict`] when an optimistic write lost
//!   a race, [`SiteGenError::StoreBusy`] when another writer holds the store
//!   lock, [`SiteGenError::StoreError`] for backing-store failures.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sitegen_onboarding::core::{SiteGenError, user_friendly_error};
//!
//! let error = SiteGenError::ParentThemeMissing { slug: "yith-wonder".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result alias used by every core operation.
pub type Result<T> = std::result::Result<T, SiteGenError>;

/// The main error type for site generation operations.
#[derive(Error, Debug)]
pub enum SiteGenError {
    /// A referenced variant, prompt or session record does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Human description of the missing thing (e.g. "homepage 'version2'")
        what: String,
    },

    /// The generation backend reported an error or returned a non-success status.
    #[error("Generation failed: {reason}")]
    GenerationFailed {
        /// Best-effort human message taken from the backend payload
        reason: String,
    },

    /// The parent theme required to derive a child theme is not installed.
    #[error("Parent theme '{slug}' is not installed")]
    ParentThemeMissing {
        /// Slug of the missing parent theme
        slug: String,
    },

    /// The parent theme's design-token document could not be read.
    #[error("Theme configuration could not be read: {path}")]
    ThemeConfigMissing {
        /// Path of the design-token document
        path: String,
    },

    /// One of the child-theme write steps failed.
    #[error("Error writing {step}")]
    WriteFailed {
        /// The failed step (e.g. "theme.json", "stylesheet", "screenshot")
        step: String,
        /// Underlying failure
        reason: String,
    },

    /// The document publishing collaborator rejected a homepage document.
    #[error("Failed to publish '{title}': {reason}")]
    PublishFailed {
        /// Title of the document that could not be published
        title: String,
        /// Underlying failure
        reason: String,
    },

    /// An optimistic write found a different record version than it expected.
    #[error("Concurrent update detected for '{key}'")]
    StoreConflict {
        /// Store key whose version did not match
        key: String,
    },

    /// Another writer holds the session store's lock.
    #[error("Session store is locked: {path}")]
    StoreBusy {
        /// Path of the lock file
        path: String,
    },

    /// The session store could not be read or written.
    #[error("Session store error: {reason}")]
    StoreError {
        /// Underlying failure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A payload did not have the expected shape.
    #[error("Invalid payload: {reason}")]
    InvalidPayload {
        /// What was wrong with the payload
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl SiteGenError {
    /// Shorthand for [`SiteGenError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
        }
    }

    /// Shorthand for [`SiteGenError::GenerationFailed`].
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SiteGenError::WriteFailed`].
    pub fn write_failed(step: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::WriteFailed {
            step: step.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a caller may safely retry the whole operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed { .. } | Self::StoreConflict { .. } | Self::StoreBusy { .. }
        )
    }
}

impl Clone for SiteGenError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound {
                what,
            } => Self::NotFound {
                what: what.clone(),
            },
            Self::GenerationFailed {
                reason,
            } => Self::GenerationFailed {
                reason: reason.clone(),
            },
            Self::ParentThemeMissing {
                slug,
            } => Self::ParentThemeMissing {
                slug: slug.clone(),
            },
            Self::ThemeConfigMissing {
                path,
            } => Self::ThemeConfigMissing {
                path: path.clone(),
            },
            Self::WriteFailed {
                step,
                reason,
            } => Self::WriteFailed {
                step: step.clone(),
                reason: reason.clone(),
            },
            Self::PublishFailed {
                title,
                reason,
            } => Self::PublishFailed {
                title: title.clone(),
                reason: reason.clone(),
            },
            Self::StoreConflict {
                key,
            } => Self::StoreConflict {
                key: key.clone(),
            },
            Self::StoreBusy {
                path,
            } => Self::StoreBusy {
                path: path.clone(),
            },
            Self::StoreError {
                reason,
            } => Self::StoreError {
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::InvalidPayload {
                reason,
            } => Self::InvalidPayload {
                reason: reason.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SiteGenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SiteGenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognises [`SiteGenError`] variants and [`std::io::Error`]; anything else
/// is wrapped as [`SiteGenError::Other`] with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sitegen_error) = error.downcast_ref::<SiteGenError>() {
        return create_error_context(sitegen_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(SiteGenError::Other {
                message: io_error.to_string(),
            })
            .with_suggestion("Check ownership of the state and themes directories")
            .with_details("sitegen needs write access to its state directory and the themes directory");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SiteGenError::Other {
        message,
    })
}

fn create_error_context(error: SiteGenError) -> ErrorContext {
    match &error {
        SiteGenError::NotFound { what } if what.contains("prompt") => ErrorContext::new(error.clone())
            .with_suggestion("Describe the site first with 'sitegen prompt \"<description>\"'")
            .with_details("Palettes and homepages are generated from the session prompt"),

        SiteGenError::NotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Run 'sitegen list' to see the available homepage slugs"),

        SiteGenError::GenerationFailed { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Retry the command. Previously generated homepages are unchanged")
            .with_details("The generation backend rejected the request or could not be reached"),

        SiteGenError::ParentThemeMissing { slug } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Install the '{slug}' theme into the themes directory, then run finalize again"
            ))
            .with_details("Child themes are derived from the configured parent theme"),

        SiteGenError::ThemeConfigMissing { path } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Check that {path} exists and contains valid JSON"))
            .with_details("The parent theme's theme.json provides the child theme's design tokens"),

        SiteGenError::WriteFailed { step, reason } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the themes directory permissions and run finalize again; it overwrites earlier output")
            .with_details(format!("Step '{step}' failed: {reason}")),

        SiteGenError::PublishFailed { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Run finalize again; documents already published are reused")
            .with_details("No theme was generated or activated"),

        _ if error.is_retryable() => ErrorContext::new(error.clone())
            .with_suggestion("Another sitegen command was using the session at the same time. Retry the command"),

        SiteGenError::ConfigError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check ~/.sitegen/config.toml or the file passed with --config"),

        _ => ErrorContext::new(error.clone()),
    }
}
