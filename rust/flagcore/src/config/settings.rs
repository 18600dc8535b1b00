//! User settings snapshot
//!
//! Read once at engine start. The keys mirror the extension's sync storage
//! (`enabledCountries`, `highlightLevel`, `extensionEnabled`,
//! `enabledPlatforms`). Any change to the store restarts the engine.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::catalog::TermCatalog;
use crate::error::{FlagError, FlagResult};

// =============================================================================
// VerbosityLevel
// =============================================================================

/// Presentation profile, ordered from least to most intrusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    Subtle,
    #[default]
    Normal,
    Assertive,
}

impl VerbosityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerbosityLevel::Subtle => "subtle",
            VerbosityLevel::Normal => "normal",
            VerbosityLevel::Assertive => "assertive",
        }
    }

    /// Unknown names fall back to `Normal`, as the options page does.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "subtle" => VerbosityLevel::Subtle,
            "assertive" => VerbosityLevel::Assertive,
            _ => VerbosityLevel::Normal,
        }
    }

    /// `aria-live` politeness for the announcement region
    pub fn live_politeness(&self) -> &'static str {
        match self {
            VerbosityLevel::Assertive => "assertive",
            _ => "polite",
        }
    }
}

/// Stored names go through `parse`, so an unknown level still starts the
/// engine at `Normal`.
impl<'de> Deserialize<'de> for VerbosityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// UserSettings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// `None` means "never saved": every catalog term is enabled.
    #[serde(default)]
    pub enabled_countries: Option<Vec<String>>,
    /// `None` means every recognized platform is enabled.
    #[serde(default)]
    pub enabled_platforms: Option<Vec<String>>,
    #[serde(default)]
    pub highlight_level: VerbosityLevel,
    #[serde(default = "default_enabled")]
    pub extension_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            enabled_countries: None,
            enabled_platforms: None,
            highlight_level: VerbosityLevel::Normal,
            extension_enabled: true,
        }
    }
}

impl UserSettings {
    pub fn from_json(json: &str) -> FlagResult<Self> {
        serde_json::from_str(json).map_err(FlagError::Settings)
    }

    /// Resolve the enabled set against the catalog.
    pub fn enabled_set(&self, catalog: &TermCatalog) -> EnabledSet {
        match &self.enabled_countries {
            Some(ids) => EnabledSet::new(ids.iter().cloned()),
            None => EnabledSet::new(catalog.ids()),
        }
    }

    /// One-line status shown by the toolbar popup.
    pub fn status_line(&self, catalog: &TermCatalog) -> String {
        if !self.extension_enabled {
            return "Disabled".to_string();
        }
        let count = match &self.enabled_countries {
            Some(ids) => ids.len(),
            None => catalog.len(),
        };
        format!("Active • {} countries", count)
    }
}

// =============================================================================
// EnabledSet
// =============================================================================

/// Immutable snapshot of enabled term identifiers for one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledSet {
    ids: HashSet<String>,
}

impl EnabledSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
