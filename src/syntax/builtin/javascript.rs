//! JavaScript language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::RuleSet;
use crate::syntax::tokens::TokenClass;

/// JavaScript rules, also used for `<script>` regions in HTML
pub fn javascript_rules() -> RuleSet {
    let mut rules = RuleSet::new();

    // Comments (block comments only within one line)
    rules
        .push("line_comment", r"//.*$", TokenClass::COMMENT, 100)
        .push("block_comment", r"/\*.*?\*/", TokenClass::COMMENT_MULTILINE, 99)
        .push("open_block_comment", r"/\*.*$", TokenClass::COMMENT_MULTILINE, 98);

    // Strings
    rules
        .push("double_string", r#""(?:[^"\\]|\\.)*""#, TokenClass::STRING, 90)
        .push("single_string", r"'(?:[^'\\]|\\.)*'", TokenClass::STRING, 90)
        .push("template", r"`(?:[^`\\]|\\.)*`", TokenClass::STRING, 90)
        .push("open_template", r"`(?:[^`\\]|\\.)*$", TokenClass::STRING, 89)
        .push("unterminated_double", r#""(?:[^"\\]|\\.)*\\?$"#, TokenClass::ERROR, 89)
        .push("unterminated_single", r"'(?:[^'\\]|\\.)*\\?$", TokenClass::ERROR, 89);

    let constants = r"\b(true|false|null|undefined|NaN|Infinity)\b";
    rules.push("constant", constants, TokenClass::KEYWORD_CONSTANT, 81);

    let keywords = r"\b(async|await|break|case|catch|class|const|continue|debugger|default|delete|do|else|export|extends|finally|for|from|function|if|import|in|instanceof|let|new|of|return|static|super|switch|this|throw|try|typeof|var|void|while|with|yield)\b";
    rules.push("keyword", keywords, TokenClass::KEYWORD, 80);

    let builtins = r"\b(Array|Boolean|Date|Error|JSON|Map|Math|Number|Object|Promise|Reflect|RegExp|Set|String|Symbol|WeakMap|console|document|globalThis|window)\b";
    rules.push("builtin", builtins, TokenClass::NAME_BUILTIN, 75);

    // Declarations and calls
    rules
        .push("type_name", r"\b[A-Z][\w$]*\b", TokenClass::NAME_CLASS, 60)
        .push("call", r"\b([A-Za-z_$][\w$]*)\s*\(", TokenClass::NAME_FUNCTION, 70);

    // Numbers
    rules
        .push("hex", r"\b0[xX][0-9a-fA-F_]+n?\b", TokenClass::NUMBER, 65)
        .push("binary", r"\b0[bB][01_]+n?\b", TokenClass::NUMBER, 65)
        .push("number", r"\b\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?n?\b", TokenClass::NUMBER, 64);

    rules
        .push("operator", r"[+\-*/%&|^!<>=~?:]+", TokenClass::OPERATOR, 40)
        .push("punctuation", r"[{}()\[\];,.]", TokenClass::PUNCTUATION, 30);

    rules
}

/// Create JavaScript language definition
pub fn javascript_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("JavaScript");
    for alias in ["js", "javascript", "mjs", "cjs"] {
        lang.add_alias(alias);
    }
    lang.host = javascript_rules();
    lang
}
