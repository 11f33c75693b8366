//! The URL Composer: pure, no I/O.

use crate::request::NamingMode;

/// Zero-pads `index` to `width` digits. Wider indices keep all their digits.
pub fn pad_index(index: u64, width: usize) -> String {
    format!("{:0width$}", index, width = width)
}

/// `{prefix}-{paddedIndex}`.
pub fn file_stem(prefix: &str, index: u64, width: usize) -> String {
    format!("{}-{}", prefix, pad_index(index, width))
}

/// Builds the exact address to fetch for one index and candidate extension.
///
/// `extension` includes its leading dot (e.g. `".jpg"`). In path-only mode the
/// token is ignored even if non-empty.
pub fn compose(
    base_address: &str,
    token: &str,
    prefix: &str,
    index: u64,
    digit_width: usize,
    extension: &str,
    mode: NamingMode,
) -> String {
    let stem = file_stem(prefix, index, digit_width);
    match mode {
        NamingMode::TokenQuery => format!("{}/{}{}?{}", base_address, stem, extension, token),
        NamingMode::PathOnly => format!("{}/{}{}", base_address, stem, extension),
    }
}
