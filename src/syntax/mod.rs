//! Syntax highlighting core
//!
//! This module provides:
//! - Grammar selection from file names and language names
//! - Tokenization through rule-based grammars or the syntect engine
//! - A per-document highlight cache that maps tokens to styled line spans

mod builtin;
mod cache;
mod engine;
mod grammar;
mod index;
mod language;
mod registry;
mod rules;
mod style;
mod tokens;
mod worker;

pub use cache::{CacheState, DocumentSource, HighlightCache, IndexUpdate};
pub use engine::EngineGrammar;
pub use grammar::{Grammar, LineScanner, Tokens};
pub use index::{fingerprint, LineToken, LineTokenIndex};
pub use language::LanguageDefinition;
pub use registry::{GrammarRegistry, PLAIN_TEXT};
pub use rules::{LineScan, LineState, PatternRule, RegionRule, RuleSet};
pub use style::{Color, Span, Style, Theme};
pub use tokens::{Token, TokenClass};
pub use worker::{HighlightWorker, RebuildRequest};
