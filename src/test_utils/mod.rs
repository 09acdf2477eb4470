//! Test utilities for sitegen
//!
//! Stubs for the external collaborators, sample data, and a once-only
//! logging setup. Available to unit tests and, through the `test-utils`
//! feature, to the integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use sitegen_onboarding::homepages::HomepageService;
//! use sitegen_onboarding::store::MemoryStore;
//! use sitegen_onboarding::test_utils::{StubBackend, fixtures};
//! use std::sync::Arc;
//!
//! # async fn example() -> sitegen_onboarding::core::Result<()> {
//! let backend = Arc::new(StubBackend::new());
//! let service = HomepageService::with_seed(Arc::new(MemoryStore::new()), backend.clone(), 1);
//! service.set_prompt(&fixtures::prompt()).await?;
//! service.generate(&fixtures::prompt(), false).await?;
//! assert_eq!(backend.home_page_calls(), 1);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
mod stubs;

pub use stubs::{StubBackend, StubPublisher};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither, tests run silently.
///
/// ```bash
/// RUST_LOG=sitegen_onboarding=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
