//! Token classes and classified spans
//!
//! Token classes form an open, dotted hierarchy (`Keyword.Type` is a child
//! of `Keyword`). Style lookup walks from a class towards its root.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// A node in the hierarchical token taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenClass(Cow<'static, str>);

impl TokenClass {
    pub const KEYWORD: TokenClass = TokenClass::from_static("Keyword");
    pub const KEYWORD_TYPE: TokenClass = TokenClass::from_static("Keyword.Type");
    pub const KEYWORD_CONSTANT: TokenClass = TokenClass::from_static("Keyword.Constant");
    pub const STRING: TokenClass = TokenClass::from_static("String");
    pub const STRING_DOC: TokenClass = TokenClass::from_static("String.Doc");
    pub const STRING_ESCAPE: TokenClass = TokenClass::from_static("String.Escape");
    pub const COMMENT: TokenClass = TokenClass::from_static("Comment");
    pub const COMMENT_MULTILINE: TokenClass = TokenClass::from_static("Comment.Multiline");
    pub const NUMBER: TokenClass = TokenClass::from_static("Number");
    pub const OPERATOR: TokenClass = TokenClass::from_static("Operator");
    pub const PUNCTUATION: TokenClass = TokenClass::from_static("Punctuation");
    pub const NAME: TokenClass = TokenClass::from_static("Name");
    pub const NAME_FUNCTION: TokenClass = TokenClass::from_static("Name.Function");
    pub const NAME_CLASS: TokenClass = TokenClass::from_static("Name.Class");
    pub const NAME_BUILTIN: TokenClass = TokenClass::from_static("Name.Builtin");
    pub const NAME_TAG: TokenClass = TokenClass::from_static("Name.Tag");
    pub const NAME_ATTRIBUTE: TokenClass = TokenClass::from_static("Name.Attribute");
    pub const NAME_VARIABLE: TokenClass = TokenClass::from_static("Name.Variable");
    pub const NAME_CONSTANT: TokenClass = TokenClass::from_static("Name.Constant");
    pub const ERROR: TokenClass = TokenClass::from_static("Error");

    const fn from_static(name: &'static str) -> Self {
        TokenClass(Cow::Borrowed(name))
    }

    /// Parse a class from its dotted name (for config loading)
    ///
    /// Every segment must be non-empty and alphanumeric (`_` and `-` allowed).
    pub fn from_name(name: &str) -> Option<Self> {
        let valid = !name.is_empty()
            && name.split('.').all(|seg| {
                !seg.is_empty()
                    && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            });
        valid.then(|| TokenClass(Cow::Owned(name.to_string())))
    }

    /// Full dotted name of this class
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Parent class, `None` for a root class
    pub fn parent(&self) -> Option<TokenClass> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| TokenClass(Cow::Owned(parent.to_string())))
    }

    /// This class's name followed by each ancestor's name, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = &str> {
        let name: &str = &self.0;
        std::iter::successors(Some(name), |&current| {
            current.rsplit_once('.').map(|(parent, _)| parent)
        })
    }

    /// Whether this class is `other` or one of its descendants
    pub fn is_a(&self, other: &TokenClass) -> bool {
        self.lineage().any(|name| name == other.name())
    }
}

// Hash and Eq match `str`, so rules keyed by class can be looked up by name
impl Borrow<str> for TokenClass {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified span of source text
///
/// `start` is a byte offset into the tokenized text; `len` is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub len: usize,
    pub class: TokenClass,
}

impl Token {
    pub fn new(start: usize, len: usize, class: TokenClass) -> Self {
        Self { start, len, class }
    }

    /// Byte offset one past the last byte of this token
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_chain() {
        let class = TokenClass::from_name("Name.Builtin.Pseudo").unwrap();
        let lineage: Vec<&str> = class.lineage().collect();
        assert_eq!(lineage, vec!["Name.Builtin.Pseudo", "Name.Builtin", "Name"]);
        assert_eq!(class.parent(), Some(TokenClass::NAME_BUILTIN));
        assert_eq!(TokenClass::KEYWORD.parent(), None);
    }

    #[test]
    fn test_is_a() {
        assert!(TokenClass::KEYWORD_TYPE.is_a(&TokenClass::KEYWORD));
        assert!(TokenClass::KEYWORD.is_a(&TokenClass::KEYWORD));
        assert!(!TokenClass::KEYWORD.is_a(&TokenClass::KEYWORD_TYPE));
        // Prefix of a segment is not an ancestor
        let keys = TokenClass::from_name("Keywords").unwrap();
        assert!(!keys.is_a(&TokenClass::KEYWORD));
    }

    #[test]
    fn test_from_name_invalid() {
        assert_eq!(TokenClass::from_name(""), None);
        assert_eq!(TokenClass::from_name("Keyword."), None);
        assert_eq!(TokenClass::from_name(".Keyword"), None);
        assert_eq!(TokenClass::from_name("Key word"), None);
    }

    #[test]
    fn test_static_and_parsed_are_equal() {
        assert_eq!(TokenClass::from_name("String.Doc"), Some(TokenClass::STRING_DOC));
    }
}
