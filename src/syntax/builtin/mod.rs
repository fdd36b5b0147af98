//! Built-in rule-based language definitions
//!
//! Languages without a built-in definition fall through to the external
//! grammar engine.

mod css;
mod html;
mod javascript;
mod json;
mod lua;
mod toml_lang;

use super::language::LanguageDefinition;

/// Get all built-in language definitions
pub fn all_languages() -> Vec<LanguageDefinition> {
    vec![
        css::css_language(),
        json::json_language(),
        lua::lua_language(),
        javascript::javascript_language(),
        toml_lang::toml_language(),
        html::html_language(),
    ]
}
