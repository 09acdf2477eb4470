//! Integration test suite for sitegen
//!
//! End-to-end tests of the onboarding flow through the public library API
//! and the `sitegen` binary. The generation backend and the document
//! publisher are replaced by the stubs in `sitegen_onboarding::test_utils`;
//! stores and themes are real, under temporary directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **homepages**: generate, regenerate, favorite and duplicate
//! - **finalize**: publishing, child themes, activation and resuming
//! - **store**: file store persistence and concurrent writers
//! - **cli**: the `sitegen` binary against a temporary home

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod finalize;
mod homepages;
mod store;
