//! JSON language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::tokens::TokenClass;

/// Create JSON language definition
pub fn json_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("JSON");
    for alias in ["json", "JSON5", "jsonc"] {
        lang.add_alias(alias);
    }

    lang.host
        // Object keys are strings followed by a colon
        .push("key", r#"("(?:[^"\\]|\\.)*")\s*:"#, TokenClass::NAME_ATTRIBUTE, 95)
        .push("string", r#""(?:[^"\\]|\\.)*""#, TokenClass::STRING, 90)
        .push("unterminated_string", r#""(?:[^"\\]|\\.)*\\?$"#, TokenClass::ERROR, 89)
        .push("constant", r"\b(true|false|null)\b", TokenClass::KEYWORD_CONSTANT, 80)
        .push("number", r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b", TokenClass::NUMBER, 65)
        .push("punctuation", r"[{}\[\],:]", TokenClass::PUNCTUATION, 30);

    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::LineState;

    #[test]
    fn test_key_and_value() {
        let text = r#"{"name": "x", "n": -1.5e3, "ok": true}"#;
        let scan = json_language().scan_line(text, 0, LineState::Host);
        let classes: Vec<(&str, &str)> = scan
            .tokens
            .iter()
            .map(|t| (&text[t.start..t.end()], t.class.name()))
            .collect();
        assert!(classes.contains(&(r#""name""#, "Name.Attribute")));
        assert!(classes.contains(&(r#""x""#, "String")));
        assert!(classes.contains(&("-1.5e3", "Number")));
        assert!(classes.contains(&("true", "Keyword.Constant")));
    }
}
