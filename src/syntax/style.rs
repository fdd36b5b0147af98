//! Display styles and the class → style mapping
//!
//! A `Theme` is immutable configuration: it maps token classes to styles
//! and falls back to the nearest ancestor class, then to a default style.

use std::collections::HashMap;

use super::tokens::TokenClass;

/// Foreground color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Whatever the renderer's default foreground is
    #[default]
    Default,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a `#rrggbb` color
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Shorthand for `Style::fg(Color::from_hex(..))`; bad input gives the default color
    pub fn hex(hex: &str) -> Self {
        Self::fg(Color::from_hex(hex).unwrap_or_default())
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A styled column range within one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte column where this span starts
    pub column: usize,
    /// Length in bytes
    pub len: usize,
    /// Style to apply to this span
    pub style: Style,
}

impl Span {
    pub fn new(column: usize, len: usize, style: Style) -> Self {
        Self { column, len, style }
    }

    /// Byte column one past the end of this span
    pub fn end(&self) -> usize {
        self.column + self.len
    }

    /// Check if this span contains a byte column
    pub fn contains(&self, column: usize) -> bool {
        column >= self.column && column < self.end()
    }
}

/// Mapping from token class to style with ancestor fallback
#[derive(Debug, Clone)]
pub struct Theme {
    rules: HashMap<TokenClass, Style>,
    default: Style,
}

impl Theme {
    /// An empty theme: every class resolves to `default`
    pub fn new(default: Style) -> Self {
        Self {
            rules: HashMap::new(),
            default,
        }
    }

    /// The built-in dark color scheme
    pub fn dark() -> Self {
        Self::new(Style::hex("#d4d4d4"))
            .with_rule(TokenClass::KEYWORD, Style::hex("#569cd6").with_bold())
            .with_rule(TokenClass::KEYWORD_TYPE, Style::hex("#4ec9b0"))
            .with_rule(TokenClass::NAME, Style::hex("#d4d4d4"))
            .with_rule(TokenClass::NAME_FUNCTION, Style::hex("#dcdcaa"))
            .with_rule(TokenClass::NAME_CLASS, Style::hex("#4ec9b0"))
            .with_rule(TokenClass::NAME_BUILTIN, Style::hex("#4ec9b0"))
            .with_rule(TokenClass::NAME_TAG, Style::hex("#569cd6"))
            .with_rule(TokenClass::NAME_ATTRIBUTE, Style::hex("#9cdcfe"))
            .with_rule(TokenClass::STRING, Style::hex("#ce9178"))
            .with_rule(TokenClass::NUMBER, Style::hex("#b5cea8"))
            .with_rule(TokenClass::COMMENT, Style::hex("#6a9955").with_italic())
            .with_rule(TokenClass::OPERATOR, Style::hex("#d4d4d4"))
            .with_rule(TokenClass::PUNCTUATION, Style::hex("#d4d4d4"))
            .with_rule(TokenClass::ERROR, Style::hex("#f44747"))
    }

    /// Builder: add or replace the rule for a class
    pub fn with_rule(mut self, class: TokenClass, style: Style) -> Self {
        self.set_rule(class, style);
        self
    }

    pub fn set_rule(&mut self, class: TokenClass, style: Style) {
        self.rules.insert(class, style);
    }

    /// Style used when neither a class nor any ancestor has a rule
    pub fn default_style(&self) -> Style {
        self.default
    }

    /// Resolve a class: exact rule, else nearest ancestor's rule, else default
    pub fn resolve(&self, class: &TokenClass) -> Style {
        class
            .lineage()
            .find_map(|name| self.rules.get(name).copied())
            .unwrap_or(self.default)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_default() {
        let style = Style::default();
        assert!(style.is_default());
        assert_eq!(style.fg, Color::Default);
        assert!(!style.bold);
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#569cd6"), Some(Color::Rgb(0x56, 0x9c, 0xd6)));
        assert_eq!(Color::from_hex("569cd6"), None);
        assert_eq!(Color::from_hex("#56"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_resolve_exact_and_ancestor() {
        let keyword = Style::hex("#111111").with_bold();
        let theme = Theme::new(Style::default()).with_rule(TokenClass::KEYWORD, keyword);

        assert_eq!(theme.resolve(&TokenClass::KEYWORD), keyword);
        // Keyword.Type has no rule of its own
        assert_eq!(theme.resolve(&TokenClass::KEYWORD_TYPE), keyword);
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_default() {
        let default = Style::hex("#d4d4d4");
        let theme = Theme::new(default).with_rule(TokenClass::KEYWORD, Style::hex("#000000"));
        let custom = TokenClass::from_name("Unknown.Custom").unwrap();
        assert_eq!(theme.resolve(&custom), default);
    }

    #[test]
    fn test_dark_theme_prefers_exact_rule() {
        let theme = Theme::dark();
        assert_eq!(theme.resolve(&TokenClass::KEYWORD_TYPE), Style::hex("#4ec9b0"));
        assert!(theme.resolve(&TokenClass::KEYWORD).bold);
        assert!(theme.resolve(&TokenClass::COMMENT_MULTILINE).italic);
    }

    #[test]
    fn test_rules_look_up_by_name() {
        let theme = Theme::dark();
        assert_eq!(theme.rules.get("Keyword.Type"), theme.rules.get(&TokenClass::KEYWORD_TYPE));
        assert!(theme.rules.get("Keyword.Declaration").is_none());
    }

    #[test]
    fn test_span_contains() {
        let span = Span::new(5, 5, Style::default());
        assert!(!span.contains(4));
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10));
    }
}
