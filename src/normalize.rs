//! Text normalization for accent- and case-insensitive comparison.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a string for comparison purposes.
///
/// Lowercases, strips diacritics via NFD decomposition ("João" → "joao"),
/// folds the filename separators `_` and `-` to spaces, and collapses
/// whitespace runs to a single trimmed space. Total and idempotent; only
/// used for comparing, never for producing output names.
///
/// Folding separators lets a stem like `Joao_Silva_relatorio` line up with
/// a spreadsheet value like `João Silva` in the containment strategy.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
