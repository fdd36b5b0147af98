//! HTML language definition
//!
//! Markup is the host; `<script>` and `<style>` bodies are embedded regions
//! tokenized with the JavaScript and CSS rules.

use tracing::warn;

use super::css::css_rules;
use super::javascript::javascript_rules;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{LineState, RegionRule, RuleSet};
use crate::syntax::tokens::TokenClass;

fn markup_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules
        .push("comment", r"<!--.*?(?:-->|$)", TokenClass::COMMENT_MULTILINE, 100)
        .push("doctype", r"(?i)<!doctype[^>]*>", TokenClass::KEYWORD, 95)
        .push("tag", r"</?[A-Za-z][\w:-]*", TokenClass::NAME_TAG, 90)
        .push("tag_end", r"/?>", TokenClass::NAME_TAG, 85)
        .push("attribute", r"\b([A-Za-z_:][\w:.-]*)\s*=", TokenClass::NAME_ATTRIBUTE, 80)
        .push("double_value", r#""[^"]*""#, TokenClass::STRING, 75)
        .push("single_value", r"'[^']*'", TokenClass::STRING, 75)
        .push("entity", r"&#?\w+;", TokenClass::NAME_CONSTANT, 70);
    rules
}

/// Embedded rules plus the closing tag of their own region
fn embedded_rules(close: &str, base: RuleSet) -> RuleSet {
    let mut rules = RuleSet::new();
    rules.push("close_tag", close, TokenClass::NAME_TAG, 1000);
    rules.extend(&base);
    rules
}

/// Create HTML language definition
pub fn html_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("HTML");
    for alias in ["html", "htm", "XHTML", "xhtml"] {
        lang.add_alias(alias);
    }
    lang.host = markup_rules();

    let regions = [
        (
            LineState::Script,
            r"(?i)<script\b[^>]*>",
            r"(?i)</script\s*>",
            embedded_rules(r"(?i)</script\s*>", javascript_rules()),
        ),
        (
            LineState::Style,
            r"(?i)<style\b[^>]*>",
            r"(?i)</style\s*>",
            embedded_rules(r"(?i)</style\s*>", css_rules()),
        ),
    ];
    for (state, start, end, rules) in regions {
        match RegionRule::new(state, start, end, rules) {
            Ok(region) => lang.add_region(region),
            Err(err) => warn!(target: "hilite::rules", grammar = "HTML", error = %err, "dropping region"),
        }
    }

    lang
}
