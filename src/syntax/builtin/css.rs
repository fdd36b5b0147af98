//! CSS language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::RuleSet;
use crate::syntax::tokens::TokenClass;

/// CSS rules, also used for `<style>` regions in HTML
pub fn css_rules() -> RuleSet {
    let mut rules = RuleSet::new();

    rules
        .push("block_comment", r"/\*.*?\*/", TokenClass::COMMENT_MULTILINE, 100)
        .push("open_block_comment", r"/\*.*$", TokenClass::COMMENT_MULTILINE, 99)
        .push("double_string", r#""(?:[^"\\]|\\.)*""#, TokenClass::STRING, 90)
        .push("single_string", r"'(?:[^'\\]|\\.)*'", TokenClass::STRING, 90)
        .push("unterminated_double", r#""(?:[^"\\]|\\.)*\\?$"#, TokenClass::ERROR, 89)
        .push("unterminated_single", r"'(?:[^'\\]|\\.)*\\?$", TokenClass::ERROR, 89);

    rules
        .push("at_rule", r"@[\w-]+", TokenClass::KEYWORD, 85)
        .push("important", r"!important\b", TokenClass::KEYWORD, 85)
        .push("color", r"#[0-9a-fA-F]{3,8}\b", TokenClass::NUMBER, 80)
        .push("property", r"\b(-?[a-zA-Z][\w-]*)\s*:\s", TokenClass::NAME_ATTRIBUTE, 75)
        .push("function", r"\b([a-zA-Z-]+)\(", TokenClass::NAME_FUNCTION, 72)
        .push("pseudo", r"::?[a-zA-Z-]+", TokenClass::NAME_BUILTIN, 70)
        .push("class_selector", r"\.[a-zA-Z_-][\w-]*", TokenClass::NAME_CLASS, 68)
        .push("id_selector", r"#[a-zA-Z_-][\w-]*", TokenClass::NAME_CONSTANT, 67)
        .push("number", r"-?\b\d+(?:\.\d+)?(?:px|em|rem|vh|vw|vmin|vmax|ch|ex|pt|pc|cm|mm|in|deg|rad|turn|s|ms|fr|%)?", TokenClass::NUMBER, 65)
        .push("tag", r"\b[a-z][a-z0-9]*\b", TokenClass::NAME_TAG, 50)
        .push("operator", r"[>+~*=]", TokenClass::OPERATOR, 40)
        .push("punctuation", r"[{}();:,]", TokenClass::PUNCTUATION, 30);

    rules
}

/// Create CSS language definition
pub fn css_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("CSS");
    lang.add_alias("css");
    lang.add_alias("QSS");
    lang.host = css_rules();
    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::LineState;

    fn classes(text: &str) -> Vec<(String, String)> {
        let scan = css_language().scan_line(text, 0, LineState::Host);
        scan.tokens
            .into_iter()
            .map(|t| (text[t.start..t.end()].to_string(), t.class.name().to_string()))
            .collect()
    }

    #[test]
    fn test_rule_block() {
        let tokens = classes("p { color: #fff; }");
        assert!(tokens.contains(&("p".to_string(), "Name.Tag".to_string())));
        assert!(tokens.contains(&("color".to_string(), "Name.Attribute".to_string())));
        assert!(tokens.contains(&("#fff".to_string(), "Number".to_string())));
    }

    #[test]
    fn test_comment() {
        let tokens = classes("/* note */ a {}");
        assert_eq!(tokens[0], ("/* note */".to_string(), "Comment.Multiline".to_string()));
    }

    #[test]
    fn test_units() {
        let tokens = classes("margin: 10px 1.5em;");
        assert!(tokens.contains(&("10px".to_string(), "Number".to_string())));
        assert!(tokens.contains(&("1.5em".to_string(), "Number".to_string())));
    }
}
