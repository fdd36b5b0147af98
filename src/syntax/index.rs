//! Per-line token index built from one full-document scan

use std::collections::HashMap;

use super::grammar::{DocumentLines, Grammar};
use super::rules::{LineScan, LineState};
use super::tokens::TokenClass;
use crate::error::{HighlightError, Result};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a hash of the whole document, used to skip unchanged rebuilds
pub fn fingerprint(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A token positioned relative to the start of its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineToken {
    pub column: usize,
    pub len: usize,
    pub class: TokenClass,
}

/// Line number → tokens on that line, plus each line's exit region
///
/// Built wholesale from one document snapshot and never patched. The index
/// remembers which grammar built it and from what text.
#[derive(Debug, Clone, Default)]
pub struct LineTokenIndex {
    lines: HashMap<usize, Vec<LineToken>>,
    exit_states: Vec<LineState>,
    fingerprint: Option<u64>,
    grammar: Option<String>,
}

impl LineTokenIndex {
    /// Index every line of `text`
    pub fn build(text: &str, grammar: &Grammar) -> Result<Self> {
        Self::build_with(text, grammar, |_| false)
    }

    /// Index every line of `text`, polling `abort` before each line
    ///
    /// Returns `RebuildAborted` as soon as `abort(line)` answers true; no
    /// partial index is ever returned.
    pub fn build_with<F>(text: &str, grammar: &Grammar, abort: F) -> Result<Self>
    where
        F: FnMut(usize) -> bool,
    {
        Self::from_scans(text, grammar.name(), grammar.scan(text), abort)
    }

    /// Index per-line scans of `text` produced by the grammar named `grammar`
    ///
    /// Tokens that are empty, fall outside their line or overlap the
    /// previous token fail the build with `TokenizationFailure`.
    pub(crate) fn from_scans<I, F>(text: &str, grammar: &str, scans: I, mut abort: F) -> Result<Self>
    where
        I: IntoIterator<Item = LineScan>,
        F: FnMut(usize) -> bool,
    {
        let mut lines = HashMap::new();
        let mut exit_states = Vec::new();
        let malformed = |line: usize, reason: &str| HighlightError::TokenizationFailure {
            grammar: grammar.to_string(),
            reason: format!("line {line}: {reason}"),
        };

        for (line_no, ((offset, content), scan)) in DocumentLines::new(text).zip(scans).enumerate() {
            if abort(line_no) {
                return Err(HighlightError::RebuildAborted);
            }

            let line_end = offset + content.len();
            let mut prev_end = offset;
            let mut tokens = Vec::with_capacity(scan.tokens.len());
            for token in scan.tokens {
                if token.len == 0 {
                    return Err(malformed(line_no, "empty token"));
                }
                if token.start < prev_end {
                    return Err(malformed(line_no, "overlapping token"));
                }
                if token.end() > line_end {
                    return Err(malformed(line_no, "token past end of line"));
                }
                prev_end = token.end();
                tokens.push(LineToken {
                    column: token.start - offset,
                    len: token.len,
                    class: token.class,
                });
            }
            if !tokens.is_empty() {
                lines.insert(line_no, tokens);
            }
            exit_states.push(scan.exit);
        }

        Ok(Self {
            lines,
            exit_states,
            fingerprint: Some(fingerprint(text)),
            grammar: Some(grammar.to_string()),
        })
    }

    /// Whether this index was built from `text` by the grammar named `grammar`
    pub fn is_built_from(&self, text: &str, grammar: &str) -> bool {
        self.grammar.as_deref() == Some(grammar) && self.fingerprint == Some(fingerprint(text))
    }

    /// Name of the grammar that built this index; `None` for an empty index
    pub fn grammar(&self) -> Option<&str> {
        self.grammar.as_deref()
    }

    /// Tokens on `line`; empty for blank or out-of-range lines
    pub fn line(&self, line: usize) -> &[LineToken] {
        self.lines.get(&line).map_or(&[], Vec::as_slice)
    }

    /// Region state `line` exits in
    pub fn exit_state(&self, line: usize) -> Option<LineState> {
        self.exit_states.get(line).copied()
    }

    /// Region state `line` is tokenized in (the previous line's exit)
    pub fn entry_state(&self, line: usize) -> Option<LineState> {
        match line {
            _ if line >= self.exit_states.len() => None,
            0 => Some(LineState::Host),
            _ => self.exit_state(line - 1),
        }
    }

    /// Number of lines in the indexed snapshot (0 for an empty index)
    pub fn line_count(&self) -> usize {
        self.exit_states.len()
    }

    /// Fingerprint of the indexed snapshot; `None` for an empty index
    pub fn fingerprint(&self) -> Option<u64> {
        self.fingerprint
    }

    /// Whether no line has any token
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
