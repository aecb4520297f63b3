//! User preferences persistence for gatecast
//!
//! Stores presentation preferences (theme, last terminal) in
//! `<cache_dir>/gatecast-preferences.json`. The value is handed to whatever
//! renders; nothing in the normalization layer reads it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "gatecast-preferences.json";

/// Color scheme of rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Dark theme (default)
    #[default]
    Dark,
    Light,
}

impl ColorScheme {
    pub fn toggle(self) -> Self {
        match self {
            ColorScheme::Dark => ColorScheme::Light,
            ColorScheme::Light => ColorScheme::Dark,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(ColorScheme::Dark),
            "light" => Some(ColorScheme::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Dark => "dark",
            ColorScheme::Light => "light",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// gatecast user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub color_scheme: ColorScheme,
    /// Terminal preselected when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_terminal: Option<String>,
}

impl Preferences {
    /// `<cache_dir>/gatecast`, if the platform has a cache dir
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("gatecast"))
    }

    /// Load preferences from `<cache_dir>/gatecast-preferences.json`.
    /// Returns defaults on any I/O or parse error (graceful degradation).
    pub fn load(cache_dir: &Path) -> Self {
        let path = cache_dir.join(PREFERENCES_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist preferences to `<cache_dir>/gatecast-preferences.json`.
    pub fn save(&self, cache_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(cache_dir)
            .context("Failed to create cache directory for preferences")?;
        let path = cache_dir.join(PREFERENCES_FILE);
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize preferences")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::load(dir.path());
        assert_eq!(prefs.color_scheme, ColorScheme::Dark);
        assert_eq!(prefs.default_terminal, None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        let prefs = Preferences {
            color_scheme: ColorScheme::Light,
            default_terminal: Some("T2".to_string()),
        };
        prefs.save(&nested).unwrap();

        assert_eq!(Preferences::load(&nested), prefs);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), "{ not json").unwrap();
        assert_eq!(Preferences::load(dir.path()), Preferences::default());
    }

    #[test]
    fn test_toggle_and_parse() {
        assert_eq!(ColorScheme::Dark.toggle(), ColorScheme::Light);
        assert_eq!(ColorScheme::parse("LIGHT"), Some(ColorScheme::Light));
        assert_eq!(ColorScheme::parse("sepia"), None);
    }
}
