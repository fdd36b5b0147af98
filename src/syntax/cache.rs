//! Per-document highlight cache
//!
//! The cache is either Clean (its token index matches the document) or
//! Dirty (the document changed since the last rebuild). Every edit calls
//! `invalidate()`; the next formatting request rebuilds the whole index
//! from the document text before answering.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::grammar::Grammar;
use super::index::{LineToken, LineTokenIndex};
use super::rules::LineState;
use super::style::{Span, Style, Theme};
use super::tokens::TokenClass;
use crate::error::Result;

/// Full text of a document, as owned by the editor view
pub trait DocumentSource {
    fn full_text(&self) -> Cow<'_, str>;
}

impl DocumentSource for str {
    fn full_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl DocumentSource for String {
    fn full_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

/// Whether the token index matches the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Clean,
    Dirty,
}

/// A finished rebuild, tagged with the document revision it was built from
#[derive(Debug, Clone)]
pub struct IndexUpdate {
    pub revision: u64,
    pub index: Arc<LineTokenIndex>,
}

/// Per-document highlighting cache
pub struct HighlightCache {
    /// Grammar for this document (None if no highlighting)
    grammar: Option<Grammar>,
    /// Class → style mapping
    theme: Theme,
    /// Resolved styles, filled lazily and cleared on theme change
    styles: HashMap<TokenClass, Style>,
    /// Token index for the last successful rebuild (empty when none)
    index: Arc<LineTokenIndex>,
    state: CacheState,
    /// Bumped by every `invalidate()`
    revision: u64,
    /// Revision of the published index
    published: u64,
}

impl HighlightCache {
    /// Create a cache with the default theme
    ///
    /// A new cache starts Dirty so the first request tokenizes the document.
    pub fn new(grammar: Option<Grammar>) -> Self {
        Self::with_theme(grammar, Theme::default())
    }

    pub fn with_theme(grammar: Option<Grammar>, theme: Theme) -> Self {
        Self {
            grammar,
            theme,
            styles: HashMap::new(),
            index: Arc::default(),
            state: CacheState::Dirty,
            revision: 0,
            published: 0,
        }
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    /// Change the grammar; the index is dropped and rebuilt on next request
    ///
    /// Updates for revisions before the switch are no longer accepted.
    pub fn set_grammar(&mut self, grammar: Option<Grammar>) {
        self.grammar = grammar;
        self.index = Arc::default();
        self.invalidate();
        self.published = self.revision;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the style mapping wholesale; the token index stays valid
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.styles.clear();
    }

    /// Mark the document as changed
    ///
    /// Called on every content edit. Calling it again while Dirty only
    /// advances the revision.
    pub fn invalidate(&mut self) {
        self.state = CacheState::Dirty;
        self.revision += 1;
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == CacheState::Dirty
    }

    /// Revision the document is at, as counted by `invalidate()`
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The current token index
    pub fn index(&self) -> &Arc<LineTokenIndex> {
        &self.index
    }

    /// Rebuild the index from `text` and mark the cache Clean
    ///
    /// An index already built from the same text by the current grammar is
    /// kept. A failed rebuild leaves an empty index (the document renders
    /// as plain text) and is not retried until the next `invalidate()`.
    pub fn rebuild(&mut self, text: &str) {
        self.rebuild_with(text, LineTokenIndex::build);
    }

    fn rebuild_with<B>(&mut self, text: &str, build: B)
    where
        B: FnOnce(&str, &Grammar) -> Result<LineTokenIndex>,
    {
        self.state = CacheState::Clean;
        self.published = self.revision;

        let Some(grammar) = &self.grammar else {
            self.index = Arc::default();
            return;
        };
        if self.index.is_built_from(text, grammar.name()) {
            debug!(target: "hilite::cache", "document unchanged; keeping index");
            return;
        }

        let started = Instant::now();
        let index = match build(text, grammar) {
            Ok(index) => {
                debug!(
                    target: "hilite::cache",
                    grammar = grammar.name(),
                    lines = index.line_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "rebuilt token index"
                );
                index
            }
            Err(err) => {
                warn!(
                    target: "hilite::cache",
                    grammar = grammar.name(),
                    error = %err,
                    "rebuild failed; rendering as plain text"
                );
                LineTokenIndex::default()
            }
        };
        self.index = Arc::new(index);
    }

    /// Install an index built elsewhere (e.g. by `HighlightWorker`)
    ///
    /// Updates older than the published index, or built by a grammar other
    /// than the current one, are ignored. The cache turns Clean only when
    /// the update is for the current revision. Returns whether the index
    /// was swapped in.
    pub fn publish(&mut self, update: IndexUpdate) -> bool {
        let built_by = update.index.grammar();
        if built_by.is_some() && built_by != self.grammar.as_ref().map(Grammar::name) {
            debug!(
                target: "hilite::cache",
                revision = update.revision,
                built_by,
                "dropping index from another grammar"
            );
            return false;
        }
        if update.revision < self.published {
            debug!(
                target: "hilite::cache",
                revision = update.revision,
                published = self.published,
                "dropping stale index"
            );
            return false;
        }
        self.published = update.revision;
        self.index = update.index;
        if update.revision == self.revision {
            self.state = CacheState::Clean;
        }
        true
    }

    /// Styled spans for one line, rebuilding first if Dirty
    ///
    /// Blank and out-of-range lines give an empty sequence.
    pub fn request_line_formatting<D>(&mut self, doc: &D, line: usize) -> Vec<Span>
    where
        D: DocumentSource + ?Sized,
    {
        if self.is_dirty() {
            let text = doc.full_text();
            self.rebuild(&text);
        }
        self.current_line_formatting(line)
    }

    /// Styled spans for one line from the current index, never rebuilding
    pub fn current_line_formatting(&mut self, line: usize) -> Vec<Span> {
        let theme = &self.theme;
        let styles = &mut self.styles;
        self.index
            .line(line)
            .iter()
            .map(|token| {
                let style = *styles
                    .entry(token.class.clone())
                    .or_insert_with(|| theme.resolve(&token.class));
                Span::new(token.column, token.len, style)
            })
            .collect()
    }

    /// Raw tokens for one line, rebuilding first if Dirty
    pub fn line_tokens<D>(&mut self, doc: &D, line: usize) -> &[LineToken]
    where
        D: DocumentSource + ?Sized,
    {
        if self.is_dirty() {
            let text = doc.full_text();
            self.rebuild(&text);
        }
        self.index.line(line)
    }

    /// Region state a line was tokenized in
    pub fn region_state(&self, line: usize) -> Option<LineState> {
        self.index.entry_state(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;
    use crate::syntax::builtin;
    use crate::syntax::registry::GrammarRegistry;
    use crate::syntax::style::Color;

    fn rules(name: &str) -> Grammar {
        let lang = builtin::all_languages()
            .into_iter()
            .find(|lang| lang.name == name)
            .unwrap();
        Grammar::Rules(Arc::new(lang))
    }

    const PAGE: &str = "<html>\n<body>\n<script>\nvar x = 1;\n</script>\n</body>\n</html>";

    #[test]
    fn test_new_cache_is_dirty() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        assert!(cache.is_dirty());
        cache.request_line_formatting("{}", 0);
        assert_eq!(cache.state(), CacheState::Clean);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.rebuild("{\"a\": 1}");
        cache.invalidate();
        cache.invalidate();
        assert!(cache.is_dirty());
        let spans = cache.request_line_formatting("{\"a\": 1}", 0);
        assert!(!cache.is_dirty());
        assert!(!spans.is_empty());
    }

    #[test]
    fn test_cache_matches_direct_tokenization() {
        let grammar = rules("HTML");
        let mut cache = HighlightCache::new(Some(grammar.clone()));
        cache.invalidate();

        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(PAGE.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let mut cached = Vec::new();
        for (line, start) in line_starts.iter().enumerate() {
            for token in cache.line_tokens(PAGE, line) {
                cached.push((start + token.column, token.len, token.class.clone()));
            }
        }
        let direct: Vec<_> = grammar
            .tokenize(PAGE)
            .map(|t| (t.start, t.len, t.class))
            .collect();
        assert_eq!(cached, direct);
    }

    #[test]
    fn test_out_of_range_line_is_empty() {
        let mut cache = HighlightCache::new(Some(rules("HTML")));
        assert!(cache.request_line_formatting(PAGE, 7).is_empty());
        assert!(cache.request_line_formatting(PAGE, 10_000).is_empty());
    }

    #[test]
    fn test_script_region_lines() {
        let mut cache = HighlightCache::new(Some(rules("HTML")));
        let tokens = cache.line_tokens(PAGE, 3).to_vec();
        let var = &tokens[0];
        assert_eq!((var.column, var.len), (0, 3));
        assert_eq!(var.class, TokenClass::KEYWORD);

        assert_eq!(cache.region_state(1), Some(LineState::Host));
        assert_eq!(cache.region_state(3), Some(LineState::Script));
        assert_eq!(cache.region_state(4), Some(LineState::Script));
        assert_eq!(cache.region_state(5), Some(LineState::Host));
    }

    #[test]
    fn test_unknown_language_renders_plain() {
        let registry = GrammarRegistry::new();
        let grammar = registry.select_grammar("Not A Real Language");
        assert!(grammar.is_none());

        let mut cache = HighlightCache::new(grammar);
        let text = "anything at all\nsecond line";
        assert!(cache.request_line_formatting(text, 0).is_empty());
        assert!(cache.request_line_formatting(text, 1).is_empty());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_style_resolution_uses_ancestor() {
        let keyword = Style::hex("#123456");
        let theme = Theme::new(Style::default()).with_rule(TokenClass::KEYWORD, keyword);
        let mut cache = HighlightCache::with_theme(Some(rules("JavaScript")), theme);
        // `var` is Keyword, `true` is Keyword.Constant
        let spans = cache.request_line_formatting("var a = true;", 0);
        assert_eq!(spans[0].style, keyword);
        let constant = spans.iter().find(|s| s.column == 8).unwrap();
        assert_eq!(constant.style, keyword);
        // `a` is not a keyword and has no rule
        assert!(spans.iter().filter(|s| s.style.is_default()).count() >= 1);
    }

    #[test]
    fn test_set_theme_keeps_index() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        let before = cache.request_line_formatting("1", 0);
        assert_eq!(before.len(), 1);

        let red = Style::fg(Color::Rgb(255, 0, 0));
        cache.set_theme(Theme::new(Style::default()).with_rule(TokenClass::NUMBER, red));
        assert!(!cache.is_dirty());
        let after = cache.current_line_formatting(0);
        assert_eq!(after, vec![Span::new(0, 1, red)]);
    }

    #[test]
    fn test_set_grammar_marks_dirty() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.rebuild("1");
        assert!(!cache.index().is_empty());
        cache.set_grammar(None);
        assert!(cache.is_dirty());
        assert!(cache.index().is_empty());
        assert!(cache.request_line_formatting("1", 0).is_empty());
    }

    #[test]
    fn test_unchanged_text_keeps_index() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.rebuild("[1, 2]");
        let first = Arc::clone(cache.index());
        cache.invalidate();
        cache.rebuild("[1, 2]");
        assert!(Arc::ptr_eq(&first, cache.index()));
        cache.invalidate();
        cache.rebuild("[1, 3]");
        assert!(!Arc::ptr_eq(&first, cache.index()));
    }

    #[test]
    fn test_edit_is_picked_up() {
        let mut cache = HighlightCache::new(Some(rules("JavaScript")));
        let mut doc = String::from("x");
        assert!(cache.request_line_formatting(&doc, 0).is_empty());

        doc.insert_str(0, "var ");
        cache.invalidate();
        let spans = cache.request_line_formatting(&doc, 0);
        assert_eq!(spans[0].column, 0);
        assert_eq!(spans[0].len, 3);
    }

    #[test]
    fn test_publish_ignores_stale_updates() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.invalidate();
        cache.invalidate();
        let revision = cache.revision();
        let fresh = Arc::new(LineTokenIndex::build("1", &rules("JSON")).unwrap());

        assert!(cache.publish(IndexUpdate {
            revision,
            index: Arc::clone(&fresh),
        }));
        assert!(!cache.is_dirty());

        assert!(!cache.publish(IndexUpdate {
            revision: revision - 1,
            index: Arc::default(),
        }));
        assert!(Arc::ptr_eq(cache.index(), &fresh));
    }

    #[test]
    fn test_publish_older_revision_stays_dirty() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.invalidate();
        let first = cache.revision();
        cache.invalidate();
        let index = Arc::new(LineTokenIndex::build("1", &rules("JSON")).unwrap());
        assert!(cache.publish(IndexUpdate { revision: first, index }));
        // Newer edits are still pending
        assert!(cache.is_dirty());
        assert_eq!(cache.current_line_formatting(0).len(), 1);
    }

    #[test]
    fn test_grammar_switch_drops_pending_update() {
        let js = rules("JavaScript");
        let mut cache = HighlightCache::new(Some(js.clone()));
        cache.invalidate();
        let revision = cache.revision();
        let pending = Arc::new(LineTokenIndex::build("var x = 1;", &js).unwrap());

        cache.set_grammar(None);
        assert!(!cache.publish(IndexUpdate {
            revision,
            index: pending,
        }));
        assert!(cache.is_dirty());
        assert!(cache.request_line_formatting("var x = 1;", 0).is_empty());
    }

    #[test]
    fn test_publish_rejects_other_grammar() {
        let text = "var x = 1;";
        let json = rules("JSON");
        let mut cache = HighlightCache::new(Some(json.clone()));
        cache.invalidate();
        let foreign = Arc::new(LineTokenIndex::build(text, &rules("JavaScript")).unwrap());
        assert!(!cache.publish(IndexUpdate {
            revision: cache.revision(),
            index: foreign,
        }));

        let cached: Vec<_> = cache
            .line_tokens(text, 0)
            .iter()
            .map(|t| (t.column, t.len, t.class.clone()))
            .collect();
        let direct: Vec<_> = json.tokenize(text).map(|t| (t.start, t.len, t.class)).collect();
        assert_eq!(cached, direct);
    }

    #[test]
    fn test_rebuild_skips_index_from_other_grammar() {
        let mut cache = HighlightCache::new(Some(rules("JavaScript")));
        cache.rebuild("true");
        let js_index = Arc::clone(cache.index());
        cache.set_grammar(Some(rules("JSON")));
        cache.rebuild("true");
        assert!(!Arc::ptr_eq(&js_index, cache.index()));
        assert_eq!(cache.index().grammar(), Some("JSON"));
    }

    #[test]
    fn test_failed_rebuild_retries_after_invalidate() {
        let mut cache = HighlightCache::new(Some(rules("JSON")));
        cache.rebuild("[1]");
        assert!(!cache.index().is_empty());

        cache.invalidate();
        cache.rebuild_with("[1, 2]", |_, grammar| {
            Err(HighlightError::TokenizationFailure {
                grammar: grammar.name().to_string(),
                reason: "line 0: overlapping token".to_string(),
            })
        });
        assert_eq!(cache.state(), CacheState::Clean);
        assert!(cache.index().is_empty());
        // Clean: no retry until the next edit
        assert!(cache.request_line_formatting("[1, 2]", 0).is_empty());

        cache.invalidate();
        assert_eq!(cache.request_line_formatting("[1, 2]", 0).len(), 5);
    }
}
