//! Placeholder-template rendering of new filenames.

use std::sync::LazyLock;

use regex::Regex;

use crate::reference::ReferenceRow;
use crate::split_extension;

/// Template token replaced with the original file's extension (without dot).
pub const EXTENSION_TOKEN: &str = "{extensao}";

/// Error recorded when no reference row matched a file.
pub const NO_MATCH_ERROR: &str = "reference data not found";

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("Failed to compile placeholder regex"));

/// Characters that cannot appear in filenames on common filesystems.
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Outcome of rendering one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub new_name: String,
    pub error: Option<String>,
}

/// Render the new filename for `original` from the matched row and template.
///
/// Without a matched row the original name is kept as a safe fallback and
/// the error is flagged for the caller to surface. `{extensao}` is replaced
/// with the original extension minus its dot; a template without the token
/// gets the original extension appended instead. Unknown `{field}`
/// placeholders degrade to empty substitutions without raising an error.
/// Illegal filename characters in the rendered name become `_`.
///
/// Same `(original, row, template)` inputs always produce the same name.
#[must_use]
pub fn render(original: &str, row: Option<&ReferenceRow>, template: &str) -> Rendered {
    let Some(row) = row else {
        return Rendered {
            new_name: original.to_string(),
            error: Some(NO_MATCH_ERROR.to_string()),
        };
    };

    let (_, extension) = split_extension(original);
    let has_extension_token = template.contains(EXTENSION_TOKEN);

    let substituted = RE_PLACEHOLDER.replace_all(template, |captures: &regex::Captures| {
        let field = &captures[1];
        if field == "extensao" {
            extension.trim_start_matches('.').to_string()
        } else {
            row.get(field).to_string()
        }
    });

    let mut new_name = sanitize_filename(&substituted);
    if !has_extension_token {
        new_name.push_str(extension);
    }

    Rendered {
        new_name,
        error: None,
    }
}

/// Replace filesystem-illegal characters with underscores.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod render_tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> ReferenceRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn renders_fields_and_extension_token() {
        let row = row(&[("matricula", "12345"), ("nome", "Ana Silva")]);
        let rendered = render("12345.pdf", Some(&row), "{nome}.{extensao}");
        assert_eq!(rendered.new_name, "Ana Silva.pdf");
        assert!(rendered.error.is_none());
    }

    #[test]
    fn no_match_keeps_original_name_with_error() {
        let rendered = render("unknown_file.pdf", None, "{nome}.{extensao}");
        assert_eq!(rendered.new_name, "unknown_file.pdf");
        assert_eq!(rendered.error.as_deref(), Some(NO_MATCH_ERROR));
    }

    #[test]
    fn extension_token_preserves_original_case() {
        let row = row(&[("nome", "Ana")]);
        let rendered = render("report.CSV", Some(&row), "{extensao}");
        assert_eq!(rendered.new_name, "CSV");
    }

    #[test]
    fn extension_appended_when_token_absent() {
        let row = row(&[("nome", "Ana Silva")]);
        let rendered = render("12345.pdf", Some(&row), "{nome}");
        assert_eq!(rendered.new_name, "Ana Silva.pdf");
    }

    #[test]
    fn file_without_extension_appends_nothing() {
        let row = row(&[("nome", "Ana Silva")]);
        let rendered = render("12345", Some(&row), "{nome}");
        assert_eq!(rendered.new_name, "Ana Silva");
    }

    #[test]
    fn missing_field_becomes_empty_without_error() {
        let row = row(&[("nome", "Ana")]);
        let rendered = render("a.txt", Some(&row), "{nome}-{setor}");
        assert_eq!(rendered.new_name, "Ana-.txt");
        assert!(rendered.error.is_none());
    }

    #[test]
    fn illegal_characters_become_underscores() {
        let row = row(&[("setor", "A/B")]);
        let rendered = render("a.txt", Some(&row), "{setor}");
        assert_eq!(rendered.new_name, "A_B.txt");
    }

    #[test]
    fn literal_template_text_is_sanitized_too() {
        let row = row(&[("nome", "Ana")]);
        let rendered = render("a.txt", Some(&row), "{nome}?final");
        assert_eq!(rendered.new_name, "Ana_final.txt");
    }

    #[test]
    fn render_is_deterministic() {
        let row = row(&[("nome", "Ana"), ("setor", "RH")]);
        let first = render("doc.pdf", Some(&row), "{nome} - {setor}.{extensao}");
        let second = render("doc.pdf", Some(&row), "{nome} - {setor}.{extensao}");
        assert_eq!(first, second);
        assert_eq!(first.new_name, "Ana - RH.pdf");
    }

    #[test]
    fn sanitize_replaces_every_illegal_character() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("plain name.txt"), "plain name.txt");
    }
}
