//! Rust identifiers and literals for emitted source

/// Words that cannot be used as plain identifiers
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// A snake_case name made safe to use as a field or function name.
///
/// Keywords get a trailing `_`, names starting with a digit get a `p_`
/// prefix. `renamed` tells the caller to emit `#[serde(rename = "...")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub ident: String,
    pub renamed: bool,
}

pub fn rust_ident(name: &str) -> Ident {
    let ident = if name.is_empty() {
        "arg".to_string()
    } else if KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("p_{}", name)
    } else {
        name.to_string()
    };
    Ident {
        renamed: ident != name,
        ident,
    }
}

/// `companies_retrieve` -> `CompaniesRetrieve`
pub fn pascal_case(name: &str) -> String {
    let pascal: String = name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if pascal.starts_with(|c: char| c.is_ascii_digit()) || pascal.is_empty() {
        format!("Tool{}", pascal)
    } else {
        pascal
    }
}

/// Escaped `"..."` literal
pub fn string_literal(text: &str) -> String {
    format!("{:?}", text)
}

/// `r#"..."#` literal with enough hashes to hold `text` verbatim
pub fn raw_string_literal(text: &str) -> String {
    let mut hashes = 1;
    while text.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}
