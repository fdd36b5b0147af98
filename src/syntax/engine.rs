//! External grammar engine (syntect) behind the line-scan contract
//!
//! Syntect grammars are context-sensitive and carry parser state across
//! lines, which gives multi-line doc-comments and triple-quoted strings.
//! Scope stacks are folded down onto the crate's `TokenClass` taxonomy.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use tracing::warn;

use super::grammar::DocumentLines;
use super::rules::{LineScan, LineState};
use super::tokens::{Token, TokenClass};

/// A syntect grammar plus the syntax set it was loaded from
pub struct EngineGrammar {
    syntaxes: Arc<SyntaxSet>,
    syntax: SyntaxReference,
}

impl EngineGrammar {
    pub fn new(syntaxes: Arc<SyntaxSet>, syntax: SyntaxReference) -> Self {
        Self { syntaxes, syntax }
    }

    pub fn name(&self) -> &str {
        &self.syntax.name
    }

    /// Lazily scan `text` line by line
    pub fn lines<'a>(&'a self, text: &'a str) -> EngineLines<'a> {
        EngineLines {
            grammar: self,
            lines: DocumentLines::new(text),
            parse: ParseState::new(&self.syntax),
            stack: ScopeStack::new(),
            buf: String::new(),
            classes: HashMap::new(),
        }
    }
}

impl fmt::Debug for EngineGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineGrammar").field("name", &self.syntax.name).finish()
    }
}

/// Look up a syntax by name, extension, or loosely normalized name
///
/// The plain-text syntax never matches: plain text means "no grammar".
pub fn find_syntax<'a>(set: &'a SyntaxSet, candidate: &str) -> Option<&'a SyntaxReference> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }
    let plain = set.find_syntax_plain_text().name.as_str();
    let found = set
        .find_syntax_by_name(trimmed)
        .or_else(|| set.find_syntax_by_extension(trimmed))
        .or_else(|| set.syntaxes().iter().find(|s| s.name.eq_ignore_ascii_case(trimmed)))
        .or_else(|| {
            let key = normalized_syntax_key(trimmed);
            if key.is_empty() {
                return None;
            }
            set.syntaxes()
                .iter()
                .find(|s| normalized_syntax_key(&s.name) == key)
        })
        .or_else(|| {
            set.syntaxes().iter().find(|s| {
                s.file_extensions
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(trimmed))
            })
        })?;
    (found.name != plain).then_some(found)
}

fn normalized_syntax_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Map one scope name onto a token class (segment-aware prefix match)
fn class_for_scope(name: &str) -> Option<TokenClass> {
    let table = [
        ("comment.block.documentation", TokenClass::STRING_DOC),
        ("comment.line.documentation", TokenClass::STRING_DOC),
        ("comment.block", TokenClass::COMMENT_MULTILINE),
        ("comment", TokenClass::COMMENT),
        ("constant.character.escape", TokenClass::STRING_ESCAPE),
        ("string", TokenClass::STRING),
        ("constant.numeric", TokenClass::NUMBER),
        ("constant.language", TokenClass::KEYWORD_CONSTANT),
        ("constant", TokenClass::NAME_CONSTANT),
        ("keyword.operator", TokenClass::OPERATOR),
        ("keyword", TokenClass::KEYWORD),
        ("storage.type", TokenClass::KEYWORD_TYPE),
        ("storage", TokenClass::KEYWORD),
        ("entity.name.function", TokenClass::NAME_FUNCTION),
        ("entity.name.class", TokenClass::NAME_CLASS),
        ("entity.name.struct", TokenClass::NAME_CLASS),
        ("entity.name.enum", TokenClass::NAME_CLASS),
        ("entity.name.trait", TokenClass::NAME_CLASS),
        ("entity.name.type", TokenClass::NAME_CLASS),
        ("entity.name.tag", TokenClass::NAME_TAG),
        ("entity.other.attribute-name", TokenClass::NAME_ATTRIBUTE),
        ("entity.name", TokenClass::NAME),
        ("support.function", TokenClass::NAME_BUILTIN),
        ("support.type", TokenClass::NAME_BUILTIN),
        ("support.class", TokenClass::NAME_BUILTIN),
        ("variable.function", TokenClass::NAME_FUNCTION),
        ("variable.language", TokenClass::NAME_BUILTIN),
        ("variable", TokenClass::NAME_VARIABLE),
        ("invalid", TokenClass::ERROR),
        ("punctuation", TokenClass::PUNCTUATION),
    ];
    table.into_iter().find_map(|(prefix, class)| {
        let hit = name == prefix
            || name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'));
        hit.then_some(class)
    })
}

/// Line scanner over an engine grammar
pub struct EngineLines<'a> {
    grammar: &'a EngineGrammar,
    lines: DocumentLines<'a>,
    parse: ParseState,
    stack: ScopeStack,
    buf: String,
    classes: HashMap<Scope, Option<TokenClass>>,
}

impl EngineLines<'_> {
    /// Class for the current scope stack
    ///
    /// Comments and strings own everything nested in them, except their
    /// own refinements (an escape inside a string stays `String.Escape`).
    fn current_class(&mut self) -> Option<TokenClass> {
        let mut innermost: Option<TokenClass> = None;
        for scope in self.stack.as_slice().iter().rev() {
            let class = self
                .classes
                .entry(*scope)
                .or_insert_with(|| class_for_scope(&scope.build_string()))
                .clone();
            let Some(class) = class else {
                continue;
            };
            let container = [TokenClass::COMMENT, TokenClass::STRING, TokenClass::ERROR]
                .iter()
                .any(|root| class.is_a(root));
            if container {
                return match innermost {
                    Some(inner) if inner.is_a(&class) => Some(inner),
                    _ => Some(class),
                };
            }
            if innermost.is_none() {
                innermost = Some(class);
            }
        }
        innermost
    }

    fn push(&mut self, tokens: &mut Vec<Token>, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let Some(class) = self.current_class() else {
            return;
        };
        match tokens.last_mut() {
            Some(last) if last.end() == start && last.class == class => last.len += end - start,
            _ => tokens.push(Token::new(start, end - start, class)),
        }
    }

    fn reset(&mut self) {
        self.parse = ParseState::new(&self.grammar.syntax);
        self.stack = ScopeStack::new();
    }

    /// Give up on the current line and restart the parser for the next one
    fn fail_line(&mut self, offset: usize, content_len: usize, reason: &str) -> LineScan {
        warn!(
            target: "hilite::engine",
            grammar = self.grammar.name(),
            offset,
            reason,
            "engine tokenization failed; marking line as error"
        );
        self.reset();
        error_line(offset, content_len)
    }
}

impl Iterator for EngineLines<'_> {
    type Item = LineScan;

    fn next(&mut self) -> Option<LineScan> {
        let (offset, line) = self.lines.next()?;
        let content_len = line.len();

        // Newline-mode syntaxes expect every line to end in '\n'
        self.buf.clear();
        self.buf.push_str(line);
        self.buf.push('\n');

        let grammar = self.grammar;
        let syntaxes = &grammar.syntaxes;
        let parsed = {
            let parse = &mut self.parse;
            let buf = self.buf.as_str();
            panic::catch_unwind(AssertUnwindSafe(|| parse.parse_line(buf, syntaxes)))
        };
        let failure = match parsed {
            Ok(Ok(ops)) => {
                let mut tokens = Vec::new();
                let mut last = 0;
                let mut failure = None;
                for (idx, op) in ops {
                    let idx = idx.min(content_len);
                    self.push(&mut tokens, offset + last, offset + idx);
                    if let Err(err) = self.stack.apply(&op) {
                        failure = Some(format!("{err:?}"));
                        break;
                    }
                    last = idx;
                }
                if failure.is_none() {
                    self.push(&mut tokens, offset + last, offset + content_len);
                    return Some(LineScan {
                        tokens,
                        exit: LineState::Host,
                    });
                }
                failure
            }
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some("parser panicked".to_string()),
        };

        let reason = failure.unwrap_or_default();
        Some(self.fail_line(offset, content_len, &reason))
    }
}

/// A line the engine could not parse: one Error token over its content
fn error_line(offset: usize, content_len: usize) -> LineScan {
    let tokens = if content_len > 0 {
        vec![Token::new(offset, content_len, TokenClass::ERROR)]
    } else {
        Vec::new()
    };
    LineScan {
        tokens,
        exit: LineState::Host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn syntaxes() -> Arc<SyntaxSet> {
        static SET: OnceLock<Arc<SyntaxSet>> = OnceLock::new();
        SET.get_or_init(|| Arc::new(SyntaxSet::load_defaults_newlines()))
            .clone()
    }

    fn grammar(name: &str) -> EngineGrammar {
        let set = syntaxes();
        let syntax = find_syntax(&set, name).unwrap().clone();
        EngineGrammar::new(set, syntax)
    }

    #[test]
    fn test_class_for_scope() {
        assert_eq!(class_for_scope("keyword.control.flow.python"), Some(TokenClass::KEYWORD));
        assert_eq!(class_for_scope("keyword.operator.arithmetic"), Some(TokenClass::OPERATOR));
        assert_eq!(class_for_scope("storage.type.rust"), Some(TokenClass::KEYWORD_TYPE));
        assert_eq!(class_for_scope("comment.block.documentation.python"), Some(TokenClass::STRING_DOC));
        assert_eq!(class_for_scope("source.python"), None);
        // "keywords" is not the "keyword" scope
        assert_eq!(class_for_scope("keywords.custom"), None);
    }

    #[test]
    fn test_find_syntax() {
        let set = syntaxes();
        assert_eq!(find_syntax(&set, "Python").map(|s| s.name.as_str()), Some("Python"));
        assert_eq!(find_syntax(&set, "py").map(|s| s.name.as_str()), Some("Python"));
        assert_eq!(find_syntax(&set, "python").map(|s| s.name.as_str()), Some("Python"));
        assert!(find_syntax(&set, "Plain Text").is_none());
        assert!(find_syntax(&set, "Not A Real Language").is_none());
        assert!(find_syntax(&set, "  ").is_none());
    }

    #[test]
    fn test_keyword_and_string() {
        let python = grammar("Python");
        let scans: Vec<LineScan> = python.lines("def f():\n    return \"x\"").collect();
        assert_eq!(scans.len(), 2);

        let first = &scans[0].tokens;
        assert!(first
            .iter()
            .any(|t| t.start == 0 && t.len == 3 && t.class.is_a(&TokenClass::KEYWORD)));

        let second = &scans[1].tokens;
        let string = second
            .iter()
            .find(|t| t.class.is_a(&TokenClass::STRING))
            .unwrap();
        // Offsets are document offsets; the string begins at `"` on line 2
        assert_eq!(string.start, 9 + 11);
    }

    #[test]
    fn test_multiline_string_spans_lines() {
        let python = grammar("Python");
        let text = "x = \"\"\"first\nsecond\n\"\"\"\ny = 1";
        let scans: Vec<LineScan> = python.lines(text).collect();
        // The middle line is entirely inside the triple-quoted string
        assert_eq!(scans[1].tokens.len(), 1);
        assert!(scans[1].tokens[0].class.is_a(&TokenClass::STRING));
        assert_eq!(scans[1].tokens[0].len, "second".len());
    }

    #[test]
    fn test_tokens_stay_inside_line_content() {
        let python = grammar("Python");
        let text = "# comment\r\nx = 1\n";
        for scan in python.lines(text) {
            for token in &scan.tokens {
                let slice = &text[token.start..token.end()];
                assert!(!slice.contains('\n') && !slice.contains('\r'));
            }
        }
    }

    #[test]
    fn test_unterminated_string_terminates() {
        let python = grammar("Python");
        let scans: Vec<LineScan> = python.lines("s = \"abc").collect();
        assert_eq!(scans.len(), 1);
        assert!(scans[0].tokens.iter().all(|t| t.end() <= 8));
    }

    #[test]
    fn test_error_line_covers_content() {
        let scan = error_line(12, 5);
        assert_eq!(scan.tokens, vec![Token::new(12, 5, TokenClass::ERROR)]);
        assert_eq!(scan.exit, LineState::Host);
        assert!(error_line(12, 0).tokens.is_empty());
    }

    #[test]
    fn test_failed_line_resets_parser() {
        let python = grammar("Python");
        let text = "x = \"\"\"first\nsecond";
        let mut lines = python.lines(text);
        lines.next().unwrap();

        // Without a reset the second line would still be inside the string
        let failed = lines.fail_line(0, 13, "parser panicked");
        assert_eq!(failed.tokens, vec![Token::new(0, 13, TokenClass::ERROR)]);
        let next = lines.next().unwrap();
        assert!(!next.tokens.iter().any(|t| t.class.is_a(&TokenClass::STRING)));
    }
}
