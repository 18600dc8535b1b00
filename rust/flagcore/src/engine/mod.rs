//! Engine: one highlighting run over one document
//!
//! Owns the compiled term index, the per-document state (page marker, live
//! region, active profile) and the reactive driver. Hosts forward their
//! events (startup, mutation batches, clock ticks) and the engine runs the
//! resulting passes synchronously against the document. In the browser
//! `PageEngine` wraps it around the live page.
//!
//! # Usage
//! ```rust,ignore
//! let inputs = EngineInputs::new(catalog, allow_list, settings);
//! if let Some(mut engine) = Engine::launch(&mut doc, &inputs, now)? {
//!     engine.on_mutations(&mut doc, now, added_nodes);
//!     engine.tick(&mut doc, now);
//! }
//! ```

pub mod driver;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod tests;

pub use driver::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::{
    DriverConfig, HostAllowList, Millis, PresentationProfile, ProfileTable, TermCatalog,
    UserSettings, VerbosityLevel,
};
use crate::dom::DocumentHost;
use crate::error::FlagResult;
use crate::highlight::{find_match, highlight_segment, text_segments, Announcer, PageMarker, TermIndex};
use crate::logging;

// =============================================================================
// Inputs
// =============================================================================

/// Everything read at startup. A change to any of it means a restart.
#[derive(Debug, Clone)]
pub struct EngineInputs {
    pub catalog: TermCatalog,
    pub allow_list: HostAllowList,
    pub settings: UserSettings,
    pub profiles: ProfileTable,
    pub driver: DriverConfig,
}

impl EngineInputs {
    pub fn new(catalog: TermCatalog, allow_list: HostAllowList, settings: UserSettings) -> Self {
        Self {
            catalog,
            allow_list,
            settings,
            profiles: ProfileTable::builtin(),
            driver: DriverConfig::default(),
        }
    }

    /// Parse the three JSON documents the extension ships or stores.
    pub fn from_json(catalog: &str, platforms: &str, settings: &str) -> FlagResult<Self> {
        let loaded = TermCatalog::from_json(catalog)
            .and_then(|c| HostAllowList::from_platforms_json(platforms).map(|p| (c, p)))
            .and_then(|(c, p)| UserSettings::from_json(settings).map(|s| (c, p, s)));

        match loaded {
            Ok((catalog, allow_list, settings)) => Ok(Self::new(catalog, allow_list, settings)),
            Err(e) => {
                logging::error("Engine", &format!("Initialization failed: {}", e));
                Err(e)
            }
        }
    }

    pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Host gate: master switch, recognized host, per-platform opt-out.
    pub fn is_eligible(&self, location: &str) -> FlagResult<bool> {
        if !self.settings.extension_enabled {
            return Ok(false);
        }
        let allow_list = match &self.settings.enabled_platforms {
            Some(enabled) => self.allow_list.restricted_to(enabled),
            None => self.allow_list.clone(),
        };
        allow_list.allows_location(location)
    }
}

// =============================================================================
// State & Reports
// =============================================================================

/// Per-document state, one instance per engine.
#[derive(Debug, Clone)]
pub struct EngineState<N> {
    pub level: VerbosityLevel,
    pub profile: PresentationProfile,
    pub page_marker: PageMarker<N>,
    pub announcer: Announcer<N>,
}

impl<N: Clone + PartialEq + Debug> EngineState<N> {
    pub fn new(level: VerbosityLevel, profile: PresentationProfile) -> Self {
        Self {
            level,
            profile,
            page_marker: PageMarker::new(),
            announcer: Announcer::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Full,
    Incremental,
}

/// Outcome of one scan pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub kind: PassKind,
    pub reason: Option<ScanReason>,
    pub segments_visited: usize,
    pub highlights: usize,
    /// Distinct display names, discovery order
    pub countries: Vec<String>,
    pub elapsed_us: u64,
    /// Text written to the live region (empty when it was cleared)
    pub announcement: String,
    pub page_marker_applied: bool,
}

impl ScanReport {
    fn new(kind: PassKind, reason: Option<ScanReason>) -> Self {
        Self {
            kind,
            reason,
            segments_visited: 0,
            highlights: 0,
            countries: Vec::new(),
            elapsed_us: 0,
            announcement: String::new(),
            page_marker_applied: false,
        }
    }

    fn record(&mut self, name: &str) {
        self.highlights += 1;
        if !self.countries.iter().any(|c| c == name) {
            self.countries.push(name.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub full_passes: u64,
    pub incremental_passes: u64,
    pub total_highlights: u64,
    pub navigations: u64,
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone)]
pub struct Engine<N> {
    index: TermIndex,
    state: EngineState<N>,
    driver: ReactiveDriver<N>,
    stats: EngineStats,
}

impl<N: Clone + Eq + Hash + Debug> Engine<N> {
    /// Gate and compile. `Ok(None)` when the engine must not run here.
    pub fn prepare(inputs: &EngineInputs, location: &str) -> FlagResult<Option<Self>> {
        if !inputs.settings.extension_enabled {
            logging::info("Engine", "Extension disabled");
            return Ok(None);
        }
        if !inputs.is_eligible(location)? {
            return Ok(None);
        }

        let enabled = inputs.settings.enabled_set(&inputs.catalog);
        let index = TermIndex::build(&inputs.catalog, &enabled);
        let level = inputs.settings.highlight_level;

        logging::info(
            "Engine",
            &format!(
                "Built patterns: {} flags, {} aliases ({} countries enabled, level {})",
                index.glyph_entries().len(),
                index.alias_entries().len(),
                enabled.len(),
                level
            ),
        );

        Ok(Some(Self {
            index,
            state: EngineState::new(level, inputs.profiles.for_level(level)),
            driver: ReactiveDriver::new(inputs.driver.clone()),
            stats: EngineStats::default(),
        }))
    }

    /// Prepare against the document's location and run the initial pass.
    pub fn launch<D>(doc: &mut D, inputs: &EngineInputs, now: Millis) -> FlagResult<Option<Self>>
    where
        D: DocumentHost<Node = N>,
    {
        let Some(mut engine) = Self::prepare(inputs, &doc.location())? else {
            return Ok(None);
        };
        engine.start(doc, now);
        Ok(Some(engine))
    }

    /// Settings changed: drop what this engine created and start over.
    /// Highlights already in the page stay.
    pub fn restart<D>(mut self, doc: &mut D, inputs: &EngineInputs, now: Millis) -> FlagResult<Option<Self>>
    where
        D: DocumentHost<Node = N>,
    {
        self.teardown(doc);
        Self::launch(doc, inputs, now)
    }

    /// Remove the engine-owned singletons (live region, page marker).
    pub fn teardown<D>(&mut self, doc: &mut D)
    where
        D: DocumentHost<Node = N>,
    {
        self.state.page_marker.reset(doc);
        self.state.announcer.remove(doc);
    }

    // -------------------------------------------------------------------------
    // Event entry points
    // -------------------------------------------------------------------------

    pub fn start<D>(&mut self, doc: &mut D, now: Millis) -> Vec<ScanReport>
    where
        D: DocumentHost<Node = N>,
    {
        let location = doc.location();
        self.dispatch(doc, DriverEvent::Start { now, location })
    }

    /// One mutation-observer batch. Non-element nodes are dropped here.
    pub fn on_mutations<D>(&mut self, doc: &mut D, now: Millis, added: Vec<N>) -> Vec<ScanReport>
    where
        D: DocumentHost<Node = N>,
    {
        let added: Vec<N> = added.into_iter().filter(|n| doc.is_element(n)).collect();
        self.dispatch(doc, DriverEvent::Mutations { now, added })
    }

    pub fn tick<D>(&mut self, doc: &mut D, now: Millis) -> Vec<ScanReport>
    where
        D: DocumentHost<Node = N>,
    {
        let location = doc.location();
        self.dispatch(doc, DriverEvent::Tick { now, location })
    }

    /// Feed the driver and run every effect it asks for, in order.
    pub fn dispatch<D>(&mut self, doc: &mut D, event: DriverEvent<N>) -> Vec<ScanReport>
    where
        D: DocumentHost<Node = N>,
    {
        let mut reports = Vec::new();
        for effect in self.driver.handle(event) {
            match effect {
                Effect::FullScan { reason } => reports.push(self.scan_full(doc, Some(reason))),
                Effect::IncrementalScan { nodes } => reports.push(self.scan_nodes(doc, &nodes)),
                Effect::ResetPageMarker => self.reset_page_marker(doc),
            }
        }
        reports
    }

    // -------------------------------------------------------------------------
    // Passes
    // -------------------------------------------------------------------------

    /// Scan the whole body, announcing what was found. A pass with no
    /// matches clears the region.
    pub fn scan_full<D>(&mut self, doc: &mut D, reason: Option<ScanReason>) -> ScanReport
    where
        D: DocumentHost<Node = N>,
    {
        let body = doc.body();
        let mut report = self.run_pass(doc, &[body], PassKind::Full, reason);
        report.announcement = self.state.announcer.announce(
            doc,
            self.state.level,
            report.highlights,
            &report.countries,
        );
        self.stats.full_passes += 1;
        report
    }

    /// Scan only the given subtrees. Announces like a full pass: a batch
    /// with no matches clears the region.
    pub fn scan_nodes<D>(&mut self, doc: &mut D, roots: &[N]) -> ScanReport
    where
        D: DocumentHost<Node = N>,
    {
        let mut report = self.run_pass(doc, roots, PassKind::Incremental, None);
        report.announcement = self.state.announcer.announce(
            doc,
            self.state.level,
            report.highlights,
            &report.countries,
        );
        self.stats.incremental_passes += 1;
        report
    }

    fn run_pass<D>(&mut self, doc: &mut D, roots: &[N], kind: PassKind, reason: Option<ScanReason>) -> ScanReport
    where
        D: DocumentHost<Node = N>,
    {
        self.driver.enter_scan();
        let started = instant::Instant::now();
        let mut report = ScanReport::new(kind, reason);

        for root in roots {
            for segment in text_segments(doc, root) {
                report.segments_visited += 1;
                let Some(text) = doc.text(&segment) else {
                    continue;
                };
                let Some(matched) = find_match(&text, &self.index) else {
                    continue;
                };
                if highlight_segment(doc, &segment, &matched, &self.state.profile.text) {
                    report.record(matched.term_name());
                    if self.state.page_marker.apply(doc, self.state.profile.page.as_ref()) {
                        report.page_marker_applied = true;
                    }
                }
            }
        }

        report.elapsed_us = started.elapsed().as_micros() as u64;
        self.stats.total_highlights += report.highlights as u64;
        self.driver.leave_scan();

        logging::debug(
            "Engine",
            &format!(
                "{:?} pass: {} segments, {} matches in {}us",
                kind, report.segments_visited, report.highlights, report.elapsed_us
            ),
        );
        report
    }

    /// Soft navigation: drop the page marker so the next page can earn its own.
    pub fn reset_page_marker<D>(&mut self, doc: &mut D)
    where
        D: DocumentHost<Node = N>,
    {
        self.state.page_marker.reset(doc);
        self.stats.navigations += 1;
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    pub fn state(&self) -> &EngineState<N> {
        &self.state
    }

    pub fn driver(&self) -> &ReactiveDriver<N> {
        &self.driver
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn level(&self) -> VerbosityLevel {
        self.state.level
    }
}
