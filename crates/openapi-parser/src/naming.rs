//! Identifier conversion for generated tool and parameter names

use regex::Regex;
use std::sync::OnceLock;

fn invalid_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]+").expect("static regex is valid"))
}

/// Convert a schema identifier to a lowercase, underscore-separated name.
///
/// An underscore is inserted before every uppercase ASCII letter except the
/// first character, the result is lowercased, each run of characters outside
/// `[a-z0-9_]` becomes a single underscore, and leading/trailing underscores
/// are trimmed. `companiesRetrieve` becomes `companies_retrieve`; output that
/// is already snake_case passes through unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut split = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            split.push('_');
        }
        split.extend(ch.to_lowercase());
    }

    invalid_run()
        .replace_all(&split, "_")
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_snake_case("companiesRetrieve"), "companies_retrieve");
        assert_eq!(to_snake_case("filingsMarkdownRetrieve"), "filings_markdown_retrieve");
    }

    #[test]
    fn test_leading_uppercase_has_no_underscore() {
        assert_eq!(to_snake_case("CompaniesList"), "companies_list");
    }

    #[test]
    fn test_consecutive_capitals_split_per_letter() {
        assert_eq!(to_snake_case("getISIN"), "get_i_s_i_n");
    }

    #[test]
    fn test_invalid_runs_collapse() {
        assert_eq!(to_snake_case("filing-types list"), "filing_types_list");
        assert_eq!(to_snake_case("a.-/b"), "a_b");
        assert_eq!(to_snake_case("--page_size--"), "page_size");
    }

    #[test]
    fn test_existing_underscores_kept() {
        assert_eq!(to_snake_case("country_iso__name"), "country_iso__name");
    }

    #[test]
    fn test_idempotent_on_snake_case() {
        for name in ["companies_list", "isic_classes_retrieve", "page_size", "job_id", "v2"] {
            assert_eq!(to_snake_case(name), name);
            assert_eq!(to_snake_case(&to_snake_case(name)), to_snake_case(name));
        }
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(to_snake_case(""), "");
        assert_eq!(to_snake_case("$$$"), "");
    }
}
