//! Identifier helpers for generated JavaScript
//!
//! Bundle ids and locales are arbitrary strings. Everything that ends up as a
//! binding name, export name or property key in the generated modules goes
//! through here.

use std::fmt::Write;

use crate::{compiler::variable_access::REGISTRY, js::printer::string_literal};

/// Prefix of the locale namespace imports in the index module
const LOCALE_NAMESPACE_PREFIX: &str = "__";

/// Words that cannot be used as binding names in strict-mode modules
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Check whether a name is reserved in module code
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Check whether `name` can be used as a bare JavaScript identifier
///
/// Only ASCII identifiers are accepted; anything else is accessed with
/// bracket notation, which is always valid.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') && !is_reserved_word(name)
}

/// Render a property key, quoting it when it is not a bare identifier
pub fn property_key(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Convert an arbitrary id into a module-level binding name
///
/// Ids made of lowercase ASCII letters, digits and underscores are kept as
/// they are. Anything else is lowercased, has every other character replaced
/// with `_`, and gets the number of uppercase letters appended so that
/// `en-US` (`en_us2`) and `en-us` (`en_us`) stay distinct.
///
/// Names the generated modules bind themselves (`registry` and the
/// `__<locale>` namespaces) get a leading `_`.
pub fn to_safe_module_id(id: &str) -> String {
    if is_plain_module_id(id) {
        return unreserve(id.to_string());
    }

    let mut safe = String::with_capacity(id.len() + 2);
    let mut uppercase = 0usize;
    for c in id.chars() {
        match c {
            'a'..='z' | '0'..='9' | '_' => safe.push(c),
            'A'..='Z' => {
                uppercase += 1;
                safe.push(c.to_ascii_lowercase());
            }
            _ => safe.push('_'),
        }
    }
    if safe.starts_with(|c: char| c.is_ascii_digit()) || safe.is_empty() {
        safe.insert(0, '_');
    }
    if uppercase > 0 {
        let _ = write!(safe, "{uppercase}");
    }
    if is_reserved_word(&safe) {
        safe.insert(0, '_');
    }
    unreserve(safe)
}

fn unreserve(mut safe: String) -> String {
    if safe == REGISTRY || safe.starts_with(LOCALE_NAMESPACE_PREFIX) {
        safe.insert(0, '_');
    }
    safe
}

fn is_plain_module_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with(|c: char| c.is_ascii_digit())
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved_word(id)
}

/// Name of the typedef describing a bundle's inputs
pub fn input_type_alias_name(safe_bundle_id: &str) -> String {
    let mut chars = safe_bundle_id.chars();
    let head = chars
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default();
    format!("{head}{}_Inputs", chars.as_str())
}

/// Binding name of a locale module's namespace import inside the index
pub fn locale_namespace(locale: &str) -> String {
    format!("{LOCALE_NAMESPACE_PREFIX}{}", to_safe_module_id(locale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_are_unchanged() {
        assert_eq!(to_safe_module_id("blue_moon_bottle"), "blue_moon_bottle");
        assert_eq!(to_safe_module_id("en"), "en");
    }

    #[test]
    fn test_uppercase_count_is_appended() {
        assert_eq!(to_safe_module_id("en-US"), "en_us2");
        assert_eq!(to_safe_module_id("en-us"), "en_us");
        assert_eq!(to_safe_module_id("helloWorld"), "helloworld1");
    }

    #[test]
    fn test_arbitrary_ids_become_identifiers() {
        let safe = to_safe_module_id("$p@44🍌");
        assert_eq!(safe, "_p_44_");
        assert!(is_valid_identifier(&safe));
        assert_eq!(to_safe_module_id("404_page"), "_404_page");
        assert_eq!(to_safe_module_id("default"), "_default");
    }

    #[test]
    fn test_generated_bindings_are_avoided() {
        assert_eq!(to_safe_module_id("registry"), "_registry");
        assert_eq!(to_safe_module_id("__de"), "___de");
        assert_eq!(to_safe_module_id("__De"), "___de1");
        assert_eq!(to_safe_module_id("_de"), "_de");
        assert_ne!(to_safe_module_id("__de"), locale_namespace("de"));
        assert_ne!(to_safe_module_id("__en_us2"), locale_namespace("en-US"));
    }

    #[test]
    fn test_identifier_validity() {
        assert!(is_valid_identifier("age"));
        assert!(is_valid_identifier("$count_2"));
        assert!(!is_valid_identifier("half!"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("class"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_property_keys() {
        assert_eq!(property_key("age"), "age");
        assert_eq!(property_key("half!"), "\"half!\"");
    }

    #[test]
    fn test_input_type_alias_name() {
        assert_eq!(input_type_alias_name("greeting"), "Greeting_Inputs");
        assert_eq!(input_type_alias_name("_404_page"), "_404_page_Inputs");
    }
}
