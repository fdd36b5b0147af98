//! Configuration file support
//!
//! Loads settings from ~/.hilite.toml (or %USERPROFILE%\.hilite.toml on Windows)
//!
//! Example:
//! ```toml
//! engine = true
//! tab_width = 4
//!
//! [extensions]
//! jsonc = "JSON"
//!
//! [theme."Keyword"]
//! color = "#c586c0"
//! bold = true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{HighlightError, Result};
use crate::syntax::{Color, Style, Theme, TokenClass};

/// Style override for one token class
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSpec {
    /// Foreground color as `#rrggbb`
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
}

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Whether the external grammar engine may be used
    pub engine: bool,
    /// Tab width for display
    pub tab_width: usize,
    /// Extra file extension → language name mappings
    pub extensions: HashMap<String, String>,
    /// Token class name → style overrides
    pub theme: HashMap<String, StyleSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: true,
            tab_width: 4,
            extensions: HashMap::new(),
            theme: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".hilite.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".hilite.toml"))
        }
    }

    /// Load configuration from the default location
    ///
    /// A missing file gives defaults; an unreadable or malformed one is
    /// logged and also gives defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!(target: "hilite::config", path = %path.display(), error = %err, "ignoring config file");
            Self::default()
        })
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse config file contents
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(contents).map_err(|err| HighlightError::Config(err.to_string()))?;
        config.tab_width = config.tab_width.clamp(1, 16);
        Ok(config)
    }

    /// The default dark theme with this config's overrides applied
    ///
    /// Entries with an invalid class name or color are logged and skipped.
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::dark();
        for (name, spec) in &self.theme {
            let Some(class) = TokenClass::from_name(name) else {
                warn!(target: "hilite::config", class = name.as_str(), "invalid token class in theme");
                continue;
            };
            let fg = match spec.color.as_deref() {
                None => Color::Default,
                Some(hex) => match Color::from_hex(hex) {
                    Some(color) => color,
                    None => {
                        warn!(target: "hilite::config", class = name.as_str(), color = hex, "invalid color in theme");
                        continue;
                    }
                },
            };
            theme.set_rule(
                class,
                Style {
                    fg,
                    bold: spec.bold,
                    italic: spec.italic,
                },
            );
        }
        theme
    }
}
