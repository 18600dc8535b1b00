//! Term catalog and recognized-host list
//!
//! Both inputs are static JSON shipped alongside the extension:
//! - `countries.json`: `[{ code, name, flag?, aliases: [..] }]`
//! - `platforms.json`: `{ "Name": "host", "Federated": ["a.host", "b.host"] }`
//!
//! Loading is a pure transform. A record with a missing alias list simply
//! contributes no aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FlagError, FlagResult};

// =============================================================================
// Term
// =============================================================================

/// One recognized entity (a country).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier (ISO-like country code)
    #[serde(alias = "code")]
    pub id: String,
    /// Display name used in annotations and announcements
    #[serde(alias = "displayName")]
    pub name: String,
    /// Literal glyph, usually a regional-indicator flag
    #[serde(default, alias = "flag", skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Term {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            glyph: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = Some(glyph.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

// =============================================================================
// TermCatalog
// =============================================================================

/// Ordered, immutable list of terms. Order matters: it is the matcher
/// priority order once the index is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermCatalog {
    terms: Vec<Term>,
}

impl TermCatalog {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn from_json(json: &str) -> FlagResult<Self> {
        serde_json::from_str(json).map_err(FlagError::Catalog)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    /// All identifiers, in catalog order
    pub fn ids(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.id.clone()).collect()
    }

    /// Terms sorted by display name, for settings screens.
    pub fn display_order(&self) -> Vec<&Term> {
        let mut sorted: Vec<&Term> = self.terms.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }
}

// =============================================================================
// HostAllowList
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PlatformEntry {
    Single(String),
    Group(Vec<String>),
}

/// Flattened list of host substrings the engine is allowed to run on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostAllowList {
    hosts: Vec<String>,
}

impl HostAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the platform map. Single hosts and federated instance lists are
    /// flattened into one list.
    pub fn from_platforms_json(json: &str) -> FlagResult<Self> {
        let map: BTreeMap<String, PlatformEntry> =
            serde_json::from_str(json).map_err(FlagError::Platforms)?;

        let mut hosts = Vec::new();
        for entry in map.into_values() {
            match entry {
                PlatformEntry::Single(host) => hosts.push(host),
                PlatformEntry::Group(group) => hosts.extend(group),
            }
        }
        Ok(Self { hosts })
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Keep only the hosts also present in `enabled`.
    pub fn restricted_to(&self, enabled: &[String]) -> Self {
        Self {
            hosts: self
                .hosts
                .iter()
                .filter(|h| enabled.contains(h))
                .cloned()
                .collect(),
        }
    }

    /// Substring containment, like the content script's host gate:
    /// `mobile.twitter.com` is allowed by `twitter.com`.
    pub fn allows(&self, host_name: &str) -> bool {
        !host_name.is_empty()
            && self
                .hosts
                .iter()
                .any(|h| !h.is_empty() && host_name.contains(h.as_str()))
    }

    /// Host gate applied to a full location (`https://host/path`).
    pub fn allows_location(&self, location: &str) -> FlagResult<bool> {
        let url = url::Url::parse(location).map_err(|source| FlagError::Location {
            location: location.to_string(),
            source,
        })?;
        Ok(url.host_str().map(|h| self.allows(h)).unwrap_or(false))
    }
}

// =============================================================================
// Tests
// =============================================================================
