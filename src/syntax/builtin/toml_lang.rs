//! TOML language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::tokens::TokenClass;

/// Create TOML language definition
pub fn toml_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("TOML");
    lang.add_alias("toml");

    // Strings (multi-line strings only highlight their first line)
    lang.host
        .push("multiline_basic", r#""""(?:[^\\]|\\.)*?(?:"""|$)"#, TokenClass::STRING_DOC, 92)
        .push("multiline_literal", r"'''.*?(?:'''|$)", TokenClass::STRING_DOC, 92)
        .push("basic_string", r#""(?:[^"\\]|\\.)*""#, TokenClass::STRING, 90)
        .push("literal_string", r"'[^']*'", TokenClass::STRING, 90)
        .push("unterminated_string", r#""(?:[^"\\]|\\.)*\\?$"#, TokenClass::ERROR, 89);

    // Comments
    lang.host.push("comment", r"#.*$", TokenClass::COMMENT, 100);

    // Table headers
    lang.host.push("table", r"^\s*\[\[?[^\]]+\]\]?", TokenClass::KEYWORD, 95);

    // Keys (only group 1; the `=` is consumed)
    lang.host.push("key", r"^\s*([A-Za-z_][\w\-.]*)\s*=", TokenClass::NAME_ATTRIBUTE, 94);

    // Booleans
    lang.host.push("boolean", r"\b(true|false)\b", TokenClass::KEYWORD_CONSTANT, 80);

    // Dates/times
    lang.host
        .push(
            "datetime",
            r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)?",
            TokenClass::NUMBER,
            75,
        )
        .push("time", r"\d{2}:\d{2}:\d{2}(?:\.\d+)?", TokenClass::NUMBER, 74);

    // Numbers
    lang.host
        .push("hex", r"\b0x[0-9a-fA-F_]+\b", TokenClass::NUMBER, 65)
        .push("binary", r"\b0b[01_]+\b", TokenClass::NUMBER, 65)
        .push("octal", r"\b0o[0-7_]+\b", TokenClass::NUMBER, 65)
        .push("special_float", r"[+-]?\b(?:inf|nan)\b", TokenClass::NUMBER, 65)
        .push("float", r"[+-]?\b\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?\b", TokenClass::NUMBER, 64);

    lang.host.push("punctuation", r"[\[\]{},=.]", TokenClass::PUNCTUATION, 30);

    lang
}
