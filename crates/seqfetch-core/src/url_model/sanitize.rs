//! Filesystem-safe file stems.

/// Replaces path separators, NUL, and control characters with `_` and trims
/// leading dots so a stem can never escape the output directory or become a
/// hidden file. Ordinary prefixes pass through unchanged.
pub fn sanitize_stem(stem: &str) -> String {
    let replaced: String = stem
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
