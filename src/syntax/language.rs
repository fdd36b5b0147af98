//! Rule-based language definitions
//!
//! A `LanguageDefinition` combines a host rule set with optional embedded
//! regions. Lines are tokenized independently; the only context carried
//! from one line to the next is the `LineState`.

use super::rules::{find_non_empty, LineScan, LineState, PatternRule, RegionRule, RuleSet};

/// A complete rule-based grammar for one language
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    /// Language name (e.g., "CSS", "HTML")
    pub name: String,
    /// Extra names this grammar answers to (e.g., "js")
    pub aliases: Vec<String>,
    /// Rules for host-language lines
    pub host: RuleSet,
    /// Embedded regions, tried in order
    pub regions: Vec<RegionRule>,
}

impl LanguageDefinition {
    /// Create a new empty language definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            host: RuleSet::new(),
            regions: Vec::new(),
        }
    }

    /// Add an alias
    pub fn add_alias(&mut self, alias: &str) {
        self.aliases.push(alias.to_string());
    }

    /// Add a host pattern rule
    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.host.add_pattern(rule);
    }

    /// Add an embedded region
    pub fn add_region(&mut self, region: RegionRule) {
        self.regions.push(region);
    }

    /// Whether `name` is this grammar's name or one of its aliases (ASCII case-insensitive)
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    fn region(&self, state: LineState) -> Option<&RegionRule> {
        self.regions.iter().find(|r| r.state == state)
    }

    fn rules_for(&self, state: LineState) -> &RuleSet {
        self.region(state).map_or(&self.host, |region| &region.rules)
    }

    /// Tokenize a single line
    ///
    /// Takes the line text (no newline), its byte offset in the document and
    /// the state the previous line exited in. The line's content is tokenized
    /// with the entry state's rules first; region markers are checked
    /// afterwards and only decide the exit state.
    pub fn scan_line(&self, text: &str, offset: usize, entry: LineState) -> LineScan {
        let mut tokens = Vec::new();
        self.rules_for(entry).tokenize_line(text, offset, &mut tokens);
        LineScan {
            tokens,
            exit: self.exit_state(text, entry),
        }
    }

    /// State after walking every region marker on the line
    fn exit_state(&self, text: &str, entry: LineState) -> LineState {
        let mut state = entry;
        let mut pos = 0;

        while pos < text.len() {
            if state.is_host() {
                let earliest = self
                    .regions
                    .iter()
                    .filter_map(|region| {
                        find_non_empty(&region.start, text, pos).map(|m| (m.start(), m.end(), region))
                    })
                    .min_by_key(|(start, _, _)| *start);
                let Some((_, end, region)) = earliest else {
                    break;
                };
                state = region.state;
                pos = end;
            } else {
                let Some(region) = self.region(state) else {
                    // State from a grammar without this region
                    return LineState::Host;
                };
                let Some(m) = find_non_empty(&region.end, text, pos) else {
                    break;
                };
                state = LineState::Host;
                pos = m.end();
            }
        }

        state
    }
}
