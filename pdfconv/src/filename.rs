//! Client filename sanitizing.

use unicode_normalization::UnicodeNormalization;

/// Returned by [`secure_filename`] when nothing usable survives sanitizing.
pub const FALLBACK_FILENAME: &str = "document.pdf";

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Accents are decomposed and dropped, path separators and whitespace runs become a single `_`,
/// anything outside `[A-Za-z0-9_.-]` is removed, and leading/trailing dots and underscores are
/// stripped. The result never contains a path component such as `..`.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
