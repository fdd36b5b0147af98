//! Language detection and grammar selection
//!
//! Two static tables drive selection: file extension → display name, and
//! display name → grammar identifier. Built-in rule grammars answer first;
//! anything else is looked up in the external engine's syntax set.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use syntect::parsing::SyntaxSet;
use tracing::debug;

use super::builtin;
use super::engine::{find_syntax, EngineGrammar};
use super::grammar::Grammar;
use super::language::LanguageDefinition;
use crate::config::Config;
use crate::error::{HighlightError, Result};

/// Display name used when nothing matches
pub const PLAIN_TEXT: &str = "Plain Text";

/// File extension (lowercase, no dot) → display name
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("pyw", "Python"),
    ("pyx", "Cython"),
    ("pxd", "Cython"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript (JSX)"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript (TSX)"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("xhtml", "XHTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "Sass"),
    ("less", "Less"),
    ("json", "JSON"),
    ("json5", "JSON5"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("toml", "TOML"),
    ("xml", "XML"),
    ("svg", "SVG"),
    ("md", "Markdown"),
    ("markdown", "Markdown"),
    ("rst", "reStructuredText"),
    ("txt", PLAIN_TEXT),
    ("c", "C"),
    ("h", "C Header"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("cc", "C++"),
    ("hpp", "C++ Header"),
    ("hxx", "C++ Header"),
    ("cs", "C#"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin Script"),
    ("scala", "Scala"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("swift", "Swift"),
    ("m", "Objective-C"),
    ("mm", "Objective-C++"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("pl", "Perl"),
    ("pm", "Perl Module"),
    ("lua", "Lua"),
    ("r", "R"),
    ("jl", "Julia"),
    ("hs", "Haskell"),
    ("lhs", "Literate Haskell"),
    ("ml", "OCaml"),
    ("mli", "OCaml Interface"),
    ("fs", "F#"),
    ("fsx", "F# Script"),
    ("ex", "Elixir"),
    ("exs", "Elixir Script"),
    ("erl", "Erlang"),
    ("hrl", "Erlang Header"),
    ("clj", "Clojure"),
    ("cljs", "ClojureScript"),
    ("lisp", "Common Lisp"),
    ("cl", "Common Lisp"),
    ("el", "Emacs Lisp"),
    ("scm", "Scheme"),
    ("rkt", "Racket"),
    ("sql", "SQL"),
    ("sh", "Shell"),
    ("bash", "Bash"),
    ("zsh", "Zsh"),
    ("fish", "Fish"),
    ("ps1", "PowerShell"),
    ("psm1", "PowerShell Module"),
    ("bat", "Batch"),
    ("cmd", "Batch"),
    ("asm", "Assembly"),
    ("s", "Assembly"),
    ("v", "Verilog"),
    ("sv", "SystemVerilog"),
    ("vhd", "VHDL"),
    ("vhdl", "VHDL"),
    ("tex", "LaTeX"),
    ("latex", "LaTeX"),
    ("bib", "BibTeX"),
    ("makefile", "Makefile"),
    ("mk", "Makefile"),
    ("cmake", "CMake"),
    ("gradle", "Gradle"),
    ("groovy", "Groovy"),
    ("dockerfile", "Dockerfile"),
    ("docker", "Dockerfile"),
    ("nginx", "Nginx"),
    ("conf", "Config"),
    ("ini", "INI"),
    ("cfg", "Config"),
    ("properties", "Properties"),
    ("env", "Environment"),
    ("gitignore", "Git Ignore"),
    ("gitattributes", "Git Attributes"),
    ("editorconfig", "EditorConfig"),
    ("qss", "QSS"),
    ("dart", "Dart"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("astro", "Astro"),
    ("zig", "Zig"),
    ("nim", "Nim"),
    ("d", "D"),
    ("pas", "Pascal"),
    ("pp", "Pascal"),
    ("f90", "Fortran"),
    ("f95", "Fortran"),
    ("f03", "Fortran"),
    ("f", "Fortran"),
    ("cob", "COBOL"),
    ("cbl", "COBOL"),
    ("ada", "Ada"),
    ("adb", "Ada"),
    ("ads", "Ada"),
    ("pro", "Prolog"),
    ("tcl", "Tcl"),
    ("awk", "AWK"),
    ("sed", "sed"),
    ("vim", "Vim Script"),
    ("applescript", "AppleScript"),
];

/// Whole file names (lowercase) that decide the language on their own
const SPECIAL_NAMES: &[(&str, &str)] = &[
    ("makefile", "Makefile"),
    ("gnumakefile", "Makefile"),
    ("dockerfile", "Dockerfile"),
    ("cmakelists.txt", "CMake"),
    ("rakefile", "Ruby"),
    ("gemfile", "Ruby"),
    (".bashrc", "Bash"),
    (".bash_profile", "Bash"),
    (".zshrc", "Zsh"),
    (".profile", "Shell"),
    (".gitignore", "Git Ignore"),
    (".gitattributes", "Git Attributes"),
    (".editorconfig", "EditorConfig"),
];

/// Display name → grammar identifier, where they differ
const GRAMMAR_ALIASES: &[(&str, &str)] = &[
    ("Cython", "Python"),
    ("JavaScript (JSX)", "JavaScript"),
    ("TypeScript", "JavaScript"),
    ("TypeScript (TSX)", "JavaScript"),
    ("XHTML", "HTML"),
    ("Vue", "HTML"),
    ("Svelte", "HTML"),
    ("Astro", "HTML"),
    ("SVG", "XML"),
    ("JSON5", "JSON"),
    ("QSS", "CSS"),
    ("C Header", "C"),
    ("C++ Header", "C++"),
    ("Kotlin Script", "Kotlin"),
    ("Perl Module", "Perl"),
    ("OCaml Interface", "OCaml"),
    ("F# Script", "F#"),
    ("Elixir Script", "Elixir"),
    ("Erlang Header", "Erlang"),
    ("ClojureScript", "Clojure"),
    ("Common Lisp", "Lisp"),
    ("Emacs Lisp", "Lisp"),
    ("Shell", "Bourne Again Shell (bash)"),
    ("Bash", "Bourne Again Shell (bash)"),
    ("Zsh", "Bourne Again Shell (bash)"),
    ("PowerShell Module", "PowerShell"),
    ("Batch", "Batch File"),
    ("Properties", "Java Properties"),
];

fn is_plain_text(identifier: &str) -> bool {
    let lower = identifier.to_ascii_lowercase();
    matches!(lower.as_str(), "" | "plain text" | "text" | "txt" | "plain" | "plaintext")
}

/// Resolves file names and language names to grammars
pub struct GrammarRegistry {
    /// Built-in rule-based grammars
    languages: Vec<Arc<LanguageDefinition>>,
    /// Extension to language name mapping
    extensions: HashMap<String, String>,
    /// Whether the external grammar engine may be used
    engine_enabled: bool,
    /// Engine syntax set, loaded on first use
    engine: OnceLock<Arc<SyntaxSet>>,
}

impl GrammarRegistry {
    /// Create a registry with built-in languages and the default tables
    pub fn new() -> Self {
        let mut registry = Self {
            languages: Vec::new(),
            extensions: LANGUAGE_NAMES
                .iter()
                .map(|(ext, name)| (ext.to_string(), name.to_string()))
                .collect(),
            engine_enabled: true,
            engine: OnceLock::new(),
        };

        for lang in builtin::all_languages() {
            registry.add_language(lang);
        }

        registry
    }

    /// Create a registry and apply config overrides
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.engine_enabled = config.engine;
        for (ext, name) in &config.extensions {
            registry.set_extension(ext, name);
        }
        registry
    }

    /// Add a rule-based language definition (replacing one with the same name)
    pub fn add_language(&mut self, lang: LanguageDefinition) {
        self.languages.retain(|existing| existing.name != lang.name);
        self.languages.push(Arc::new(lang));
    }

    /// Map a file extension (with or without the dot) to a language name
    pub fn set_extension(&mut self, ext: &str, language: &str) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.extensions.insert(ext, language.to_string());
    }

    /// Enable or disable the external grammar engine
    pub fn set_engine_enabled(&mut self, enabled: bool) {
        self.engine_enabled = enabled;
    }

    /// Detect the display name for a file path
    pub fn language_for_path(&self, path: &Path) -> String {
        let special = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_lowercase())
            .and_then(|name| {
                SPECIAL_NAMES
                    .iter()
                    .find(|(special, _)| *special == name)
                    .map(|(_, language)| language.to_string())
            });
        if let Some(language) = special {
            return language;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.extensions.get(&ext.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| PLAIN_TEXT.to_string())
    }

    /// Sorted, deduplicated display names (for language pickers)
    pub fn all_language_names(&self) -> Vec<String> {
        self.extensions
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Select a grammar by display name or alias
    ///
    /// `None` means "no highlighting": callers render plain text.
    pub fn select_grammar(&self, identifier: &str) -> Option<Grammar> {
        match self.resolve(identifier) {
            Ok(grammar) => {
                debug!(target: "hilite::registry", identifier, grammar = grammar.name(), "grammar selected");
                Some(grammar)
            }
            Err(err) => {
                debug!(target: "hilite::registry", identifier, error = %err, "no grammar");
                None
            }
        }
    }

    /// Select a grammar for a file path
    pub fn select_grammar_for_path(&self, path: &Path) -> Option<Grammar> {
        self.select_grammar(&self.language_for_path(path))
    }

    fn resolve(&self, identifier: &str) -> Result<Grammar> {
        let identifier = identifier.trim();
        let not_found = || HighlightError::GrammarNotFound(identifier.to_string());
        if is_plain_text(identifier) {
            return Err(not_found());
        }

        let target = GRAMMAR_ALIASES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(identifier))
            .map_or(identifier, |(_, target)| *target);
        let candidates = [target, identifier];

        for candidate in candidates {
            if let Some(lang) = self.languages.iter().find(|lang| lang.answers_to(candidate)) {
                return Ok(Grammar::Rules(Arc::clone(lang)));
            }
        }

        let syntaxes = self.engine().ok_or_else(not_found)?;
        candidates
            .into_iter()
            .find_map(|candidate| find_syntax(syntaxes, candidate))
            .map(|syntax| {
                Grammar::Engine(Arc::new(EngineGrammar::new(Arc::clone(syntaxes), syntax.clone())))
            })
            .ok_or_else(not_found)
    }

    fn engine(&self) -> Option<&Arc<SyntaxSet>> {
        if !self.engine_enabled {
            return None;
        }
        Some(
            self.engine
                .get_or_init(|| Arc::new(SyntaxSet::load_defaults_newlines())),
        )
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::new()
    }
}
