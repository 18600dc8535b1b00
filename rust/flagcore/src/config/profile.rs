//! Presentation profiles
//!
//! Each verbosity level maps to a text-run style (applied to every highlight
//! span) and an optional page-level style (the viewport border). Property
//! names are CSS (kebab-case); every declaration is applied `!important`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::settings::VerbosityLevel;
use crate::error::{FlagError, FlagResult};

/// CSS declarations, property -> value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleProfile {
    declarations: BTreeMap<String, String>,
}

impl StyleProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: &str, value: &str) -> Self {
        self.declarations.insert(property.to_string(), value.to_string());
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations.get(property).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts.
    pub fn merged(&self, other: &StyleProfile) -> StyleProfile {
        let mut declarations = self.declarations.clone();
        for (k, v) in &other.declarations {
            declarations.insert(k.clone(), v.clone());
        }
        StyleProfile { declarations }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationProfile {
    pub text: StyleProfile,
    #[serde(default)]
    pub page: Option<StyleProfile>,
}

// =============================================================================
// ProfileTable
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileTable {
    profiles: BTreeMap<VerbosityLevel, PresentationProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// The shipped table: underline, marker-pen, marker-pen plus page border.
    pub fn builtin() -> Self {
        let marker_pen = StyleProfile::new()
            .with("background-color", "#fef08a")
            .with("color", "#000")
            .with("padding", "2px 4px")
            .with("border-radius", "3px");

        let mut profiles = BTreeMap::new();
        profiles.insert(
            VerbosityLevel::Subtle,
            PresentationProfile {
                text: StyleProfile::new()
                    .with("text-decoration", "underline")
                    .with("text-decoration-color", "#f59e0b")
                    .with("text-decoration-thickness", "2px")
                    .with("text-underline-offset", "2px"),
                page: None,
            },
        );
        profiles.insert(
            VerbosityLevel::Normal,
            PresentationProfile {
                text: marker_pen.clone(),
                page: None,
            },
        );
        profiles.insert(
            VerbosityLevel::Assertive,
            PresentationProfile {
                text: marker_pen.with("font-weight", "600"),
                page: Some(
                    StyleProfile::new()
                        .with("border", "2px solid #fef08a")
                        .with("opacity", ".5"),
                ),
            },
        );
        Self { profiles }
    }

    /// Levels missing from the JSON keep their built-in profile.
    pub fn from_json(json: &str) -> FlagResult<Self> {
        let overrides: BTreeMap<VerbosityLevel, PresentationProfile> =
            serde_json::from_str(json).map_err(FlagError::Profiles)?;
        let mut table = Self::builtin();
        table.profiles.extend(overrides);
        Ok(table)
    }

    pub fn for_level(&self, level: VerbosityLevel) -> PresentationProfile {
        self.profiles.get(&level).cloned().unwrap_or_default()
    }
}
