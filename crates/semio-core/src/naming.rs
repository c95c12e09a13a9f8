//! Case conversion and Rust identifier rules for generated names.
//!
//! Schema names are written in PascalCase. Modules, fields and accessors are
//! derived from them with [`to_snake_case`], flag constants with
//! [`to_screaming_snake_case`].

/// Words that need the `r#` prefix to be used as identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be turned into raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Returns `true` for a plain ASCII identifier `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns `true` if `name` is a reserved word of the target language.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name) || NON_RAW_KEYWORDS.contains(&name)
}

/// Returns `true` if `name` cannot be used as an identifier even with `r#`.
pub fn is_unescapable(name: &str) -> bool {
    NON_RAW_KEYWORDS.contains(&name)
}

/// Escapes `name` as a raw identifier when it collides with a keyword.
///
/// ```
/// use semio_core::naming::rust_ident;
///
/// assert_eq!(rust_ident("use"), "r#use");
/// assert_eq!(rust_ident("height"), "height");
/// ```
pub fn rust_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Converts a PascalCase or camelCase name to snake_case.
///
/// Acronyms are kept together: `HTTPServer` becomes `http_server`.
///
/// ```
/// use semio_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("BuildingVolume"), "building_volume");
/// assert_eq!(to_snake_case("CountPeople"), "count_people");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower);
                if boundary {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Converts a name to SCREAMING_SNAKE_CASE.
pub fn to_screaming_snake_case(name: &str) -> String {
    to_snake_case(name).to_ascii_uppercase()
}
