//! TermIndex: compiled matchers for the enabled terms
//!
//! Two ordered lists, glyph entries then alias entries, both in catalog
//! order. Selection runs on two prefilters built over those lists:
//! - an Aho-Corasick automaton over every glyph (lowest pattern id wins)
//! - a `RegexSet` over every alias pattern (lowest pattern id wins)
//!
//! Picking the lowest matching id keeps "first entry in index order wins"
//! while touching the text once per list instead of once per entry.
//!
//! The index is rebuilt from scratch whenever the enabled set changes.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind as AcMatchKind};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::{EnabledSet, TermCatalog};
use crate::logging;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[serde(rename = "flag")]
    Glyph,
    Alias,
}

impl MatchKind {
    /// Value of the `data-match-type` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Glyph => "flag",
            MatchKind::Alias => "alias",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Literal text, substring containment
    Glyph(String),
    /// `\b<escaped alias>\b`, case-insensitive
    Alias { text: String, regex: Regex },
}

/// One compiled pattern tied to the term that owns it.
#[derive(Debug, Clone)]
pub struct MatcherEntry {
    pub term_id: String,
    pub term_name: String,
    pub pattern: Pattern,
}

impl MatcherEntry {
    pub fn kind(&self) -> MatchKind {
        match self.pattern {
            Pattern::Glyph(_) => MatchKind::Glyph,
            Pattern::Alias { .. } => MatchKind::Alias,
        }
    }

    /// Source text of the pattern (the glyph or the alias as written)
    pub fn source(&self) -> &str {
        match &self.pattern {
            Pattern::Glyph(g) => g,
            Pattern::Alias { text, .. } => text,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Pattern::Glyph(g) => text.contains(g.as_str()),
            Pattern::Alias { regex, .. } => regex.is_match(text),
        }
    }

    /// Every non-overlapping occurrence, left to right.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        match &self.pattern {
            Pattern::Glyph(g) => text
                .match_indices(g.as_str())
                .map(|(start, m)| start..start + m.len())
                .collect(),
            Pattern::Alias { regex, .. } => regex.find_iter(text).map(|m| m.range()).collect(),
        }
    }
}

/// Word-bounded, case-insensitive pattern with every metacharacter escaped.
pub fn alias_pattern(alias: &str) -> String {
    format!(r"\b{}\b", regex::escape(alias))
}

// =============================================================================
// TermIndex
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    glyphs: Vec<MatcherEntry>,
    aliases: Vec<MatcherEntry>,
    glyph_automaton: Option<AhoCorasick>,
    alias_set: Option<RegexSet>,
}

impl TermIndex {
    /// Compile the enabled subset of `catalog`, in catalog order.
    pub fn build(catalog: &TermCatalog, enabled: &EnabledSet) -> Self {
        let mut glyphs = Vec::new();
        let mut aliases = Vec::new();

        for term in catalog.terms() {
            if !enabled.contains(&term.id) {
                continue;
            }

            if let Some(glyph) = term.glyph.as_deref().filter(|g| !g.is_empty()) {
                glyphs.push(MatcherEntry {
                    term_id: term.id.clone(),
                    term_name: term.name.clone(),
                    pattern: Pattern::Glyph(glyph.to_string()),
                });
            }

            for alias in term.aliases.iter().filter(|a| !a.trim().is_empty()) {
                let regex = match RegexBuilder::new(&alias_pattern(alias))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(r) => r,
                    Err(e) => {
                        logging::warn("TermIndex", &format!("Skipping alias '{}': {}", alias, e));
                        continue;
                    }
                };
                aliases.push(MatcherEntry {
                    term_id: term.id.clone(),
                    term_name: term.name.clone(),
                    pattern: Pattern::Alias {
                        text: alias.clone(),
                        regex,
                    },
                });
            }
        }

        let glyph_automaton = Self::build_automaton(&glyphs);
        let alias_set = Self::build_alias_set(&aliases);

        Self {
            glyphs,
            aliases,
            glyph_automaton,
            alias_set,
        }
    }

    fn build_automaton(glyphs: &[MatcherEntry]) -> Option<AhoCorasick> {
        if glyphs.is_empty() {
            return None;
        }
        AhoCorasickBuilder::new()
            .match_kind(AcMatchKind::Standard)
            .build(glyphs.iter().map(|e| e.source()))
            .map_err(|e| logging::warn("TermIndex", &format!("Glyph automaton unavailable: {}", e)))
            .ok()
    }

    fn build_alias_set(aliases: &[MatcherEntry]) -> Option<RegexSet> {
        if aliases.is_empty() {
            return None;
        }
        RegexSetBuilder::new(aliases.iter().map(|e| alias_pattern(e.source())))
            .case_insensitive(true)
            .build()
            .map_err(|e| logging::warn("TermIndex", &format!("Alias set unavailable: {}", e)))
            .ok()
    }

    pub fn glyph_entries(&self) -> &[MatcherEntry] {
        &self.glyphs
    }

    pub fn alias_entries(&self) -> &[MatcherEntry] {
        &self.aliases
    }

    pub fn pattern_count(&self) -> usize {
        self.glyphs.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty() && self.aliases.is_empty()
    }

    /// First glyph entry (index order) contained in `text`.
    pub fn first_glyph(&self, text: &str) -> Option<&MatcherEntry> {
        match &self.glyph_automaton {
            Some(ac) => ac
                .find_overlapping_iter(text)
                .map(|m| m.pattern().as_usize())
                .min()
                .and_then(|id| self.glyphs.get(id)),
            None => self.glyphs.iter().find(|e| e.is_match(text)),
        }
    }

    /// First alias entry (index order) matching `text`.
    pub fn first_alias(&self, text: &str) -> Option<&MatcherEntry> {
        match &self.alias_set {
            Some(set) => set
                .matches(text)
                .iter()
                .next()
                .and_then(|id| self.aliases.get(id)),
            None => self.aliases.iter().find(|e| e.is_match(text)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
