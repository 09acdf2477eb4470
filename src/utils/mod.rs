//! Cross-cutting utilities: atomic file writes, spinners and slug helpers.

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write, write_json_file};
pub use progress::Spinner;

/// Lowercase a string and collapse everything that is not ASCII
/// alphanumeric into single dashes.
#[must_use]
pub fn sanitize_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
