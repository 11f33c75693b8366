//! Address composition and local file naming.
//!
//! Remote addresses follow `{base}/{prefix}-{paddedIndex}{ext}` with an
//! optional `?{token}` suffix; local names reuse the same stem with the
//! canonical extension, sanitized for the filesystem.

mod compose;
mod extension;
mod sanitize;

pub use compose::{compose, file_stem, pad_index};
pub use extension::{default_candidates, CandidateExtension, ExtensionError};
pub use sanitize::sanitize_stem;

/// Local file name for a stem and an extension given without the dot.
///
/// # Examples
///
/// - `local_file_name("album-007", "jpg")` → `"album-007.jpg"`
/// - `local_file_name("a/b-001", "png")` → `"a_b-001.png"`
pub fn local_file_name(stem: &str, extension: &str) -> String {
    format!("{}.{}", sanitize_stem(stem), extension)
}
