//! Pattern rules for rule-based grammars
//!
//! A `RuleSet` is an ordered list of (pattern, class) pairs applied to one
//! line at a time. A `RegionRule` switches a line range over to a different
//! rule set between a start and an end marker.

use regex::{Match, Regex};
use tracing::warn;

use super::tokens::{Token, TokenClass};
use crate::error::{HighlightError, Result};

/// A single-line pattern rule
///
/// Matches a regex pattern and assigns a token class to the match. When the
/// pattern has a capture group, only group 1 becomes the token and the rest
/// of the match is consumed as plain text (the regex crate has no lookaround).
/// Rules are tried in priority order (highest first).
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Token class to assign to matches
    pub class: TokenClass,
    /// Priority (higher = matched first)
    pub priority: i32,
}

impl PatternRule {
    /// Create a new pattern rule
    pub fn new(name: &str, pattern: &str, class: TokenClass, priority: i32) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| HighlightError::InvalidPattern {
            rule: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
            class,
            priority,
        })
    }

    /// Find the first non-empty match at or after `start`
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        find_non_empty(&self.pattern, text, start).map(|m| (m.start(), m.end()))
    }

    /// Byte range to classify for a match beginning at `start`
    pub fn token_range(&self, text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
        if self.pattern.captures_len() <= 1 {
            return Some((start, end));
        }
        let group = self.pattern.captures_at(text, start)?.get(1)?;
        (!group.is_empty()).then(|| (group.start(), group.end()))
    }
}

/// First non-empty match of `pattern` at or after `start`
///
/// Searching the whole line (rather than a suffix slice) keeps `^` and `\b`
/// anchored to the real line.
pub(crate) fn find_non_empty<'t>(pattern: &Regex, text: &'t str, start: usize) -> Option<Match<'t>> {
    let mut at = start;
    while at <= text.len() {
        let m = pattern.find_at(text, at)?;
        if !m.is_empty() {
            return Some(m);
        }
        at = next_char_boundary(text, m.start());
    }
    None
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Priority-ordered pattern rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    patterns: Vec<PatternRule>,
}

#[derive(Clone, Copy)]
enum NextMatch {
    Unsearched,
    Found(usize, usize),
    Exhausted,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled rule, keeping the list sorted by priority
    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.patterns.push(rule);
        // Stable: equal priorities keep insertion order
        self.patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Compile and add a rule; a pattern that fails to compile is logged and skipped
    pub fn push(&mut self, name: &str, pattern: &str, class: TokenClass, priority: i32) -> &mut Self {
        match PatternRule::new(name, pattern, class, priority) {
            Ok(rule) => self.add_pattern(rule),
            Err(err) => warn!(target: "hilite::rules", rule = name, error = %err, "dropping rule"),
        }
        self
    }

    /// Append every rule of `other`
    pub fn extend(&mut self, other: &RuleSet) {
        for rule in &other.patterns {
            self.add_pattern(rule.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[PatternRule] {
        &self.patterns
    }

    /// Tokenize one line (without its newline)
    ///
    /// `offset` is added to every token start so callers can place the line
    /// inside a larger document. At each position the earliest match wins;
    /// among matches starting at the same byte the highest priority wins.
    /// Text no rule matches is left untokenized.
    pub fn tokenize_line(&self, text: &str, offset: usize, out: &mut Vec<Token>) {
        // Each rule's next match is cached until the cursor passes its start,
        // so every rule searches the line O(tokens it could emit) times.
        let mut next = vec![NextMatch::Unsearched; self.patterns.len()];
        let mut pos = 0;

        while pos < text.len() {
            let mut best: Option<(usize, usize, usize)> = None;
            for (idx, rule) in self.patterns.iter().enumerate() {
                let stale = match next[idx] {
                    NextMatch::Unsearched => true,
                    NextMatch::Found(start, _) => start < pos,
                    NextMatch::Exhausted => false,
                };
                if stale {
                    next[idx] = match rule.find_at(text, pos) {
                        Some((start, end)) => NextMatch::Found(start, end),
                        None => NextMatch::Exhausted,
                    };
                }
                if let NextMatch::Found(start, end) = next[idx] {
                    if best.map_or(true, |(best_start, _, _)| start < best_start) {
                        best = Some((start, end, idx));
                    }
                }
            }

            let Some((start, end, idx)) = best else {
                break;
            };
            let rule = &self.patterns[idx];
            if let Some((tok_start, tok_end)) = rule.token_range(text, start, end) {
                out.push(Token::new(offset + tok_start, tok_end - tok_start, rule.class.clone()));
            }
            pos = end;
        }
    }
}

/// Region a line is tokenized in (carried from line to line)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineState {
    /// The grammar's own rules
    #[default]
    Host,
    /// Embedded script (e.g. `<script>` in markup)
    Script,
    /// Embedded stylesheet (e.g. `<style>` in markup)
    Style,
}

impl LineState {
    pub fn is_host(&self) -> bool {
        *self == LineState::Host
    }
}

/// An embedded region with its own rules
#[derive(Debug, Clone)]
pub struct RegionRule {
    /// State lines inside this region carry
    pub state: LineState,
    /// Marker that opens the region
    pub start: Regex,
    /// Marker that closes the region
    pub end: Regex,
    /// Rules applied to lines entered in this region
    pub rules: RuleSet,
}

impl RegionRule {
    pub fn new(state: LineState, start: &str, end: &str, rules: RuleSet) -> Result<Self> {
        let compile = |rule: &str, pattern: &str| {
            Regex::new(pattern).map_err(|source| HighlightError::InvalidPattern {
                rule: rule.to_string(),
                source,
            })
        };
        Ok(Self {
            state,
            start: compile("region_start", start)?,
            end: compile("region_end", end)?,
            rules,
        })
    }
}

/// Tokens of one line plus the state the next line starts in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineScan {
    pub tokens: Vec<Token>,
    pub exit: LineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(rules: &RuleSet, text: &str) -> Vec<(usize, usize, String)> {
        let mut out = Vec::new();
        rules.tokenize_line(text, 0, &mut out);
        out.into_iter()
            .map(|t| (t.start, t.len, t.class.name().to_string()))
            .collect()
    }

    #[test]
    fn test_pattern_rule() {
        let rule = PatternRule::new("number", r"\d+", TokenClass::NUMBER, 50).unwrap();
        assert_eq!(rule.find_at("abc 123 def", 0), Some((4, 7)));
        assert_eq!(rule.find_at("abc 123 def", 5), Some((5, 7)));
        assert_eq!(rule.find_at("no numbers", 0), None);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = PatternRule::new("broken", r"(unclosed", TokenClass::ERROR, 1).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidPattern { .. }));
    }

    #[test]
    fn test_push_skips_invalid_pattern() {
        let mut rules = RuleSet::new();
        rules
            .push("broken", r"[", TokenClass::ERROR, 10)
            .push("number", r"\d+", TokenClass::NUMBER, 5);
        assert_eq!(rules.len(), 1);
        assert_eq!(tokens(&rules, "x 42"), vec![(2, 2, "Number".to_string())]);
    }

    #[test]
    fn test_priority_wins_at_same_position() {
        let mut rules = RuleSet::new();
        rules
            .push("ident", r"\b\w+\b", TokenClass::NAME, 10)
            .push("keyword", r"\blet\b", TokenClass::KEYWORD, 80);
        assert_eq!(
            tokens(&rules, "let x"),
            vec![(0, 3, "Keyword".to_string()), (4, 1, "Name".to_string())]
        );
    }

    #[test]
    fn test_earliest_match_wins_over_priority() {
        let mut rules = RuleSet::new();
        rules
            .push("comment", r"//.*$", TokenClass::COMMENT, 100)
            .push("number", r"\d+", TokenClass::NUMBER, 10);
        assert_eq!(
            tokens(&rules, "1 // 2"),
            vec![(0, 1, "Number".to_string()), (2, 4, "Comment".to_string())]
        );
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let mut rules = RuleSet::new();
        rules.push("maybe", r"a*", TokenClass::NAME, 1);
        assert_eq!(tokens(&rules, "bbaab"), vec![(2, 2, "Name".to_string())]);
        assert!(tokens(&rules, "bbb").is_empty());
    }

    #[test]
    fn test_capture_group_limits_token() {
        let mut rules = RuleSet::new();
        rules
            .push("property", r"([a-z-]+)\s*:", TokenClass::NAME_ATTRIBUTE, 10)
            .push("number", r"\d+", TokenClass::NUMBER, 5);
        assert_eq!(
            tokens(&rules, "margin : 0"),
            vec![(0, 6, "Name.Attribute".to_string()), (9, 1, "Number".to_string())]
        );
    }

    #[test]
    fn test_offset_applies_to_tokens() {
        let mut rules = RuleSet::new();
        rules.push("number", r"\d+", TokenClass::NUMBER, 1);
        let mut out = Vec::new();
        rules.tokenize_line("a 7", 100, &mut out);
        assert_eq!(out, vec![Token::new(102, 1, TokenClass::NUMBER)]);
    }

    #[test]
    fn test_multibyte_text() {
        let mut rules = RuleSet::new();
        rules.push("maybe", r"x*", TokenClass::NAME, 1);
        // Empty matches inside multi-byte chars must not split them
        assert_eq!(tokens(&rules, "é€x"), vec![(5, 1, "Name".to_string())]);
    }

    #[test]
    fn test_line_state_default() {
        assert!(LineState::default().is_host());
        assert!(!LineState::Script.is_host());
    }
}
