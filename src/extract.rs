//! Candidate identifier extraction from filenames.

use std::sync::LazyLock;

use regex::Regex;

use crate::split_extension;

/// Column-name terms that mark a match column as name-like.
///
/// Name-like columns compare whole filename stems and may fall back to the
/// fuzzy strategies; anything else is treated as a code or ID column and
/// must match exactly.
const NAME_COLUMN_TERMS: [&str; 4] = ["nome", "name", "colaborador", "funcionario"];

static RE_LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:[\s_-]|$)").expect("Failed to compile leading digits regex"));

static RE_TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-](\d+)$").expect("Failed to compile trailing digits regex"));

static RE_LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Za-z]+)(?:[\s_-]|$)").expect("Failed to compile leading token regex"));

/// Check whether the match column holds person-style names rather than codes.
#[must_use]
pub fn is_name_column(match_column: &str) -> bool {
    let lowered = match_column.to_lowercase();
    NAME_COLUMN_TERMS.iter().any(|term| lowered.contains(term))
}

/// Derive the candidate matching key from a raw filename.
///
/// Name-like columns use the whole extension-stripped stem; the fuzzy
/// matching strategies absorb whatever variation remains. Code-like columns
/// try, in order, to isolate a leading digit run, a trailing digit run, or
/// a leading alphanumeric token, each delimited by space, `_` or `-`, and
/// fall back to the full stem when no pattern applies. Never empty for a
/// non-empty filename.
#[must_use]
pub fn extract_identifier(filename: &str, match_column: &str) -> String {
    let (stem, _) = split_extension(filename);
    let stem = if stem.is_empty() { filename } else { stem };

    if is_name_column(match_column) {
        return stem.to_string();
    }

    for pattern in [&RE_LEADING_DIGITS, &RE_TRAILING_DIGITS, &RE_LEADING_TOKEN] {
        if let Some(token) = pattern.captures(stem).and_then(|captures| captures.get(1)) {
            return token.as_str().to_string();
        }
    }
    stem.to_string()
}


#[cfg(test)]
mod extract_tests {
    use super::*;

    #[test]
    fn name_column_returns_full_stem() {
        assert_eq!(
            extract_identifier("Joao_Silva_relatorio.pdf", "nome"),
            "Joao_Silva_relatorio"
        );
        assert_eq!(extract_identifier("Ana Souza.docx", "colaborador"), "Ana Souza");
    }

    #[test]
    fn code_column_takes_bare_digit_stem() {
        assert_eq!(extract_identifier("12345.pdf", "matricula"), "12345");
    }

    #[test]
    fn code_column_takes_leading_digits() {
        assert_eq!(extract_identifier("12345_holerite.pdf", "matricula"), "12345");
        assert_eq!(extract_identifier("12345 recibo.pdf", "matricula"), "12345");
    }

    #[test]
    fn code_column_takes_trailing_digits() {
        assert_eq!(extract_identifier("holerite_12345.pdf", "matricula"), "12345");
        assert_eq!(extract_identifier("recibo-98765.pdf", "matricula"), "98765");
    }

    #[test]
    fn code_column_takes_leading_alphanumeric_token() {
        assert_eq!(extract_identifier("AB12_contrato.pdf", "matricula"), "AB12");
        assert_eq!(extract_identifier("contrato final.pdf", "matricula"), "contrato");
    }

    #[test]
    fn code_column_falls_back_to_full_stem() {
        assert_eq!(extract_identifier("çontrato.pdf", "matricula"), "çontrato");
        assert_eq!(extract_identifier("nota#1.pdf", "matricula"), "nota#1");
    }

    #[test]
    fn no_extension_uses_whole_name() {
        assert_eq!(extract_identifier("12345", "matricula"), "12345");
        assert_eq!(extract_identifier("Ana Souza", "nome"), "Ana Souza");
    }

    #[test]
    fn dotfile_falls_back_to_full_name() {
        assert_eq!(extract_identifier(".env", "nome"), ".env");
    }
}
