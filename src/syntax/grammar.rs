//! One tokenize contract over both grammar families
//!
//! Callers hold a `Grammar` and never branch on whether a rule-based
//! definition or the external engine serves it.

use std::fmt;
use std::sync::Arc;

use super::engine::{EngineGrammar, EngineLines};
use super::language::LanguageDefinition;
use super::rules::{LineScan, LineState};
use super::tokens::Token;

/// A selected grammar, cheap to clone
#[derive(Debug, Clone)]
pub enum Grammar {
    /// Ordered regex rules applied per line, with optional embedded regions
    Rules(Arc<LanguageDefinition>),
    /// Context-sensitive grammar from the external engine
    Engine(Arc<EngineGrammar>),
}

impl Grammar {
    pub fn name(&self) -> &str {
        match self {
            Grammar::Rules(lang) => &lang.name,
            Grammar::Engine(engine) => engine.name(),
        }
    }

    /// Scan `text` line by line
    ///
    /// Each item holds the tokens of one line (document offsets) and the
    /// region state the next line starts in.
    pub fn scan<'a>(&'a self, text: &'a str) -> LineScanner<'a> {
        let inner = match self {
            Grammar::Rules(lang) => ScanInner::Rules {
                lang,
                lines: DocumentLines::new(text),
                state: LineState::Host,
            },
            Grammar::Engine(engine) => ScanInner::Engine(engine.lines(text)),
        };
        LineScanner { inner }
    }

    /// Tokenize `text` into a flat, ordered token sequence
    ///
    /// The sequence is lazy and restartable: calling `tokenize` again with
    /// the same text yields the same tokens.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            lines: self.scan(text),
            current: Vec::new().into_iter(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lines of a document as `(byte offset, content)` pairs
///
/// Splits on `\n` and drops a trailing `\r`. Text ending in `\n` has a
/// final empty line; empty text is one empty line.
#[derive(Debug, Clone)]
pub(crate) struct DocumentLines<'a> {
    rest: Option<&'a str>,
    offset: usize,
}

impl<'a> DocumentLines<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            rest: Some(text),
            offset: 0,
        }
    }
}

impl<'a> Iterator for DocumentLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        let offset = self.offset;
        let line = match rest.split_once('\n') {
            Some((line, tail)) => {
                self.rest = Some(tail);
                self.offset += line.len() + 1;
                line
            }
            None => {
                self.rest = None;
                rest
            }
        };
        Some((offset, line.strip_suffix('\r').unwrap_or(line)))
    }
}

enum ScanInner<'a> {
    Rules {
        lang: &'a LanguageDefinition,
        lines: DocumentLines<'a>,
        state: LineState,
    },
    Engine(EngineLines<'a>),
}

/// Per-line scan over either grammar family
pub struct LineScanner<'a> {
    inner: ScanInner<'a>,
}

impl Iterator for LineScanner<'_> {
    type Item = LineScan;

    fn next(&mut self) -> Option<LineScan> {
        match &mut self.inner {
            ScanInner::Rules { lang, lines, state } => {
                let (offset, line) = lines.next()?;
                let scan = lang.scan_line(line, offset, *state);
                *state = scan.exit;
                Some(scan)
            }
            ScanInner::Engine(engine) => engine.next(),
        }
    }
}

/// Flat token stream produced by `Grammar::tokenize`
pub struct Tokens<'a> {
    lines: LineScanner<'a>,
    current: std::vec::IntoIter<Token>,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.current.next() {
                return Some(token);
            }
            self.current = self.lines.next()?.tokens.into_iter();
        }
    }
}
