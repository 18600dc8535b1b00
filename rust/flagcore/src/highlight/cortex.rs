//! HighlightCortex: stateless matching surface for JS hosts
//!
//! The content script keeps DOM work on its side and asks the cortex, one
//! text segment at a time, what to mark and how to style it:
//! - `matchText` - which term owns a segment, if any
//! - `runs` - the literal/marked split the host turns into nodes
//! - `textStyle` / `pageStyle` - declarations for the active level
//! - `announcement` - live-region sentence for a pass
//! - `allowsLocation` - host gate for the current page
//!
//! Hydration compiles the term index once; every other call is a pure
//! lookup against it.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::announcer::compose_announcement;
use super::highlighter::{split_runs, Run};
use super::matcher::{find_match, MatchDescriptor};
use super::term_index::TermIndex;
use crate::config::{
    HostAllowList, PresentationProfile, ProfileTable, Term, TermCatalog, UserSettings, VerbosityLevel,
};
use crate::engine::EngineInputs;
use crate::error::FlagResult;
use crate::logging;

/// Catalog row for settings screens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    pub enabled: bool,
}

#[wasm_bindgen]
pub struct HighlightCortex {
    inputs: EngineInputs,
    index: TermIndex,
    profile: PresentationProfile,
}

impl Default for HighlightCortex {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightCortex {
    pub fn new() -> Self {
        let inputs = EngineInputs::new(
            TermCatalog::default(),
            HostAllowList::default(),
            UserSettings::default(),
        );
        let profile = inputs.profiles.for_level(inputs.settings.highlight_level);
        Self {
            inputs,
            index: TermIndex::default(),
            profile,
        }
    }

    /// Replace every input and recompile.
    pub fn hydrate(&mut self, inputs: EngineInputs) {
        let enabled = inputs.settings.enabled_set(&inputs.catalog);
        self.index = TermIndex::build(&inputs.catalog, &enabled);
        self.profile = inputs.profiles.for_level(inputs.settings.highlight_level);
        self.inputs = inputs;

        logging::info(
            "HighlightCortex",
            &format!(
                "Hydrated {} terms into {} patterns",
                self.inputs.catalog.len(),
                self.index.pattern_count()
            ),
        );
    }

    /// Settings changed; the catalog and host list stay.
    pub fn update_settings(&mut self, settings: UserSettings) {
        let mut inputs = self.inputs.clone();
        inputs.settings = settings;
        self.hydrate(inputs);
    }

    pub fn set_profiles(&mut self, profiles: ProfileTable) {
        self.profile = profiles.for_level(self.inputs.settings.highlight_level);
        self.inputs.profiles = profiles;
    }

    pub fn match_text(&self, text: &str) -> Option<MatchDescriptor> {
        find_match(text, &self.index).map(|m| m.describe(text))
    }

    /// Runs for `text`, or empty when no term owns it.
    pub fn runs(&self, text: &str) -> Vec<Run> {
        match find_match(text, &self.index) {
            Some(matched) => split_runs(text, &matched),
            None => Vec::new(),
        }
    }

    pub fn profile(&self) -> &PresentationProfile {
        &self.profile
    }

    pub fn level(&self) -> VerbosityLevel {
        self.inputs.settings.highlight_level
    }

    pub fn allows_location(&self, location: &str) -> FlagResult<bool> {
        self.inputs.is_eligible(location)
    }

    pub fn status_line(&self) -> String {
        self.inputs.settings.status_line(&self.inputs.catalog)
    }

    /// Every catalog term sorted by name, flagged with its enabled state.
    pub fn catalog_entries(&self) -> Vec<CatalogEntry> {
        let enabled = self.inputs.settings.enabled_set(&self.inputs.catalog);
        self.inputs
            .catalog
            .display_order()
            .into_iter()
            .map(|term: &Term| CatalogEntry {
                id: term.id.clone(),
                name: term.name.clone(),
                glyph: term.glyph.clone(),
                enabled: enabled.contains(&term.id),
            })
            .collect()
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    match value.serialize(&serializer) {
        Ok(v) => v,
        Err(e) => {
            logging::error("HighlightCortex", &format!("Serialization failed: {:?}", e));
            JsValue::NULL
        }
    }
}

#[wasm_bindgen]
impl HighlightCortex {
    #[wasm_bindgen(constructor)]
    pub fn js_new() -> Self {
        Self::new()
    }

    /// Hydrate from the shipped catalog, platform map and stored settings
    /// (all JSON text).
    #[wasm_bindgen(js_name = hydrate)]
    pub fn js_hydrate(&mut self, catalog: &str, platforms: &str, settings: &str) -> Result<(), JsValue> {
        let inputs = EngineInputs::from_json(catalog, platforms, settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.hydrate(inputs.with_profiles(self.inputs.profiles.clone()));
        Ok(())
    }

    #[wasm_bindgen(js_name = updateSettings)]
    pub fn js_update_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: UserSettings = serde_wasm_bindgen::from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))?;
        self.update_settings(settings);
        Ok(())
    }

    /// Override presentation profiles, e.g. `{ "subtle": { "text": {..} } }`.
    #[wasm_bindgen(js_name = setProfiles)]
    pub fn js_set_profiles(&mut self, json: &str) -> Result<(), JsValue> {
        let profiles = ProfileTable::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.set_profiles(profiles);
        Ok(())
    }

    #[wasm_bindgen(js_name = matchText)]
    pub fn js_match_text(&self, text: &str) -> JsValue {
        match self.match_text(text) {
            Some(m) => to_js(&m),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = runs)]
    pub fn js_runs(&self, text: &str) -> JsValue {
        to_js(&self.runs(text))
    }

    #[wasm_bindgen(js_name = textStyle)]
    pub fn js_text_style(&self) -> JsValue {
        to_js(&self.profile.text)
    }

    /// `null` when the level has no page-level treatment.
    #[wasm_bindgen(js_name = pageStyle)]
    pub fn js_page_style(&self) -> JsValue {
        match &self.profile.page {
            Some(style) => to_js(style),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = level)]
    pub fn js_level(&self) -> String {
        self.level().as_str().to_string()
    }

    #[wasm_bindgen(js_name = livePoliteness)]
    pub fn js_live_politeness(&self) -> String {
        self.level().live_politeness().to_string()
    }

    /// `names` are distinct display names in discovery order.
    #[wasm_bindgen(js_name = announcement)]
    pub fn js_announcement(&self, count: usize, names: Vec<String>) -> String {
        compose_announcement(count, &names)
    }

    #[wasm_bindgen(js_name = allowsLocation)]
    pub fn js_allows_location(&self, location: &str) -> Result<bool, JsValue> {
        self.allows_location(location)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = statusLine)]
    pub fn js_status_line(&self) -> String {
        self.status_line()
    }

    #[wasm_bindgen(js_name = catalogEntries)]
    pub fn js_catalog_entries(&self) -> JsValue {
        to_js(&self.catalog_entries())
    }

    #[wasm_bindgen(js_name = patternCount)]
    pub fn js_pattern_count(&self) -> usize {
        self.index.pattern_count()
    }
}
