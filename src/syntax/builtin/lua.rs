//! Lua language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::tokens::TokenClass;

/// Create Lua language definition
pub fn lua_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Lua");
    lang.add_alias("lua");

    lang.host
        .push("long_comment", r"--\[=*\[.*?\]=*\]", TokenClass::COMMENT_MULTILINE, 101)
        .push("comment", r"--.*$", TokenClass::COMMENT, 100)
        .push("long_string", r"\[\[.*?\]\]", TokenClass::STRING, 91)
        .push("double_string", r#""(?:[^"\\]|\\.)*""#, TokenClass::STRING, 90)
        .push("single_string", r"'(?:[^'\\]|\\.)*'", TokenClass::STRING, 90)
        .push("unterminated_double", r#""(?:[^"\\]|\\.)*\\?$"#, TokenClass::ERROR, 89)
        .push("unterminated_single", r"'(?:[^'\\]|\\.)*\\?$", TokenClass::ERROR, 89)
        .push("constant", r"\b(true|false|nil)\b", TokenClass::KEYWORD_CONSTANT, 81)
        .push(
            "keyword",
            r"\b(and|break|do|else|elseif|end|for|function|goto|if|in|local|not|or|repeat|return|then|until|while)\b",
            TokenClass::KEYWORD,
            80,
        )
        .push(
            "builtin",
            r"\b(assert|error|ipairs|pairs|pcall|print|require|select|setmetatable|getmetatable|tonumber|tostring|type|xpcall|math|string|table|os|io|coroutine)\b",
            TokenClass::NAME_BUILTIN,
            75,
        )
        .push("call", r"\b([A-Za-z_]\w*)\s*\(", TokenClass::NAME_FUNCTION, 70)
        .push("hex", r"\b0[xX][0-9a-fA-F]+\b", TokenClass::NUMBER, 65)
        .push("number", r"\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b", TokenClass::NUMBER, 64)
        .push("operator", r"\.\.\.?|[+\-*/%^#=<>~]=?", TokenClass::OPERATOR, 40)
        .push("punctuation", r"[{}()\[\];:,.]", TokenClass::PUNCTUATION, 30);

    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::LineState;

    #[test]
    fn test_local_and_comment() {
        let text = "local x = 10 -- note";
        let scan = lua_language().scan_line(text, 0, LineState::Host);
        let classes: Vec<(&str, &str)> = scan
            .tokens
            .iter()
            .map(|t| (&text[t.start..t.end()], t.class.name()))
            .collect();
        assert_eq!(classes[0], ("local", "Keyword"));
        assert_eq!(classes.last(), Some(&("-- note", "Comment")));
    }

    #[test]
    fn test_function_definition() {
        let text = "function run(a)";
        let scan = lua_language().scan_line(text, 0, LineState::Host);
        let classes: Vec<(&str, &str)> = scan
            .tokens
            .iter()
            .map(|t| (&text[t.start..t.end()], t.class.name()))
            .collect();
        assert_eq!(classes[0], ("function", "Keyword"));
        assert_eq!(classes[1], ("run", "Name.Function"));
    }
}
