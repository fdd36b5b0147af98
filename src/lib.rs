//! hilite: incremental syntax highlighting
//!
//! Pick a grammar with [`syntax::GrammarRegistry`], hand it to a
//! [`syntax::HighlightCache`], call `invalidate()` on every edit and
//! `request_line_formatting()` for every visible line.

pub mod config;
pub mod error;
pub mod syntax;

pub use config::Config;
pub use error::{HighlightError, Result};
