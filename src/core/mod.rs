//! Core types shared by every module: the error taxonomy and its
//! user-facing presentation.

pub mod error;

pub use error::{ErrorContext, Result, SiteGenError, user_friendly_error};
