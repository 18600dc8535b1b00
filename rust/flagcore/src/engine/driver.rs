//! ReactiveDriver: when to scan
//!
//! A pure state machine. The host feeds it events stamped with its own clock
//! (`Start`, `Mutations`, `Tick`) and gets back the effects to run. It owns
//! no timers: every "timer" is a deadline compared against the timestamp of
//! the next event, so tests drive it with a hand-advanced clock.
//!
//! # States
//! `Idle` → (`Start`) → `Armed` ⇄ `Scanning`
//!
//! # Triggers
//! - mutation batches: debounced, then one incremental pass over the union
//!   of added nodes
//! - backoff schedule: one-shot full passes measured from start
//! - periodic: recurring full pass
//! - navigation poll: on a changed location, reset the page marker and
//!   schedule a full pass after a settle delay

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use wasm_bindgen::prelude::*;

use crate::config::{DriverConfig, Millis};

// =============================================================================
// Events & Effects
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent<N> {
    /// Startup succeeded; `location` is the initial navigation target.
    Start { now: Millis, location: String },
    /// One mutation-observer batch; `added` are the added element nodes.
    Mutations { now: Millis, added: Vec<N> },
    /// Clock advanced; `location` is the current navigation target.
    Tick { now: Millis, location: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanReason {
    Initial,
    Backoff,
    Periodic,
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect<N> {
    FullScan { reason: ScanReason },
    IncrementalScan { nodes: Vec<N> },
    ResetPageMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverPhase {
    Idle,
    Armed,
    Scanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    Debounce,
    Backoff,
    Periodic,
    NavigationPoll,
    NavigationRescan(usize),
}

// =============================================================================
// ReactiveDriver
// =============================================================================

#[derive(Debug, Clone)]
pub struct ReactiveDriver<N> {
    config: DriverConfig,
    phase: DriverPhase,
    pending: Vec<N>,
    /// Membership index over `pending`
    queued: HashSet<N>,
    debounce_at: Option<Millis>,
    backoff_at: VecDeque<Millis>,
    periodic_at: Option<Millis>,
    poll_at: Option<Millis>,
    navigation_rescans_at: Vec<Millis>,
    last_location: String,
}

impl<N: Clone + Eq + Hash> ReactiveDriver<N> {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            phase: DriverPhase::Idle,
            pending: Vec::new(),
            queued: HashSet::new(),
            debounce_at: None,
            backoff_at: VecDeque::new(),
            periodic_at: None,
            poll_at: None,
            navigation_rescans_at: Vec::new(),
            last_location: String::new(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn last_location(&self) -> &str {
        &self.last_location
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest armed deadline, so a host can sleep until then.
    pub fn next_deadline(&self) -> Option<Millis> {
        [
            self.debounce_at,
            self.backoff_at.front().copied(),
            self.periodic_at,
            self.poll_at,
            self.navigation_rescans_at.iter().min().copied(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Mark a pass as running. Passes never nest.
    pub fn enter_scan(&mut self) {
        if self.phase == DriverPhase::Armed {
            self.phase = DriverPhase::Scanning;
        }
    }

    pub fn leave_scan(&mut self) {
        if self.phase == DriverPhase::Scanning {
            self.phase = DriverPhase::Armed;
        }
    }

    /// Feed one event; returns the passes to run, in order.
    pub fn handle(&mut self, event: DriverEvent<N>) -> Vec<Effect<N>> {
        match event {
            DriverEvent::Start { now, location } => self.start(now, location),
            DriverEvent::Mutations { now, added } => {
                if self.phase == DriverPhase::Idle {
                    return Vec::new();
                }
                let effects = self.advance(now, None);
                self.record(now, added);
                effects
            }
            DriverEvent::Tick { now, location } => {
                if self.phase == DriverPhase::Idle {
                    return Vec::new();
                }
                self.advance(now, Some(&location))
            }
        }
    }

    fn start(&mut self, now: Millis, location: String) -> Vec<Effect<N>> {
        if self.phase != DriverPhase::Idle {
            return Vec::new();
        }

        self.phase = DriverPhase::Armed;
        self.last_location = location;
        self.backoff_at = self.config.backoff_ms.iter().map(|d| now + d).collect();
        self.periodic_at = (self.config.periodic_ms > 0).then(|| now + self.config.periodic_ms);
        self.poll_at = (self.config.navigation_poll_ms > 0).then(|| now + self.config.navigation_poll_ms);

        vec![Effect::FullScan {
            reason: ScanReason::Initial,
        }]
    }

    /// Queue added nodes and (re)arm the debounce deadline.
    fn record(&mut self, now: Millis, added: Vec<N>) {
        for node in added {
            if self.queued.insert(node.clone()) {
                self.pending.push(node);
            }
        }
        self.debounce_at = Some(now + self.config.debounce_ms);
    }

    /// Fire every deadline at or before `now`, oldest first. The navigation
    /// poll only fires when the event carries a location.
    fn advance(&mut self, now: Millis, location: Option<&str>) -> Vec<Effect<N>> {
        let mut effects = Vec::new();

        while let Some((at, due)) = self.earliest_due(now, location.is_some()) {
            match due {
                Due::Debounce => {
                    self.debounce_at = None;
                    let nodes = std::mem::take(&mut self.pending);
                    self.queued.clear();
                    if !nodes.is_empty() {
                        effects.push(Effect::IncrementalScan { nodes });
                    }
                }
                Due::Backoff => {
                    self.backoff_at.pop_front();
                    push_full(&mut effects, ScanReason::Backoff);
                }
                Due::Periodic => {
                    self.periodic_at = Some(next_after(at, self.config.periodic_ms, now));
                    push_full(&mut effects, ScanReason::Periodic);
                }
                Due::NavigationPoll => {
                    self.poll_at = Some(next_after(at, self.config.navigation_poll_ms, now));
                    if let Some(current) = location {
                        if current != self.last_location {
                            self.last_location = current.to_string();
                            effects.push(Effect::ResetPageMarker);
                            self.navigation_rescans_at.push(at + self.config.navigation_settle_ms);
                        }
                    }
                }
                Due::NavigationRescan(i) => {
                    self.navigation_rescans_at.swap_remove(i);
                    push_full(&mut effects, ScanReason::Navigation);
                }
            }
        }
        effects
    }

    fn earliest_due(&self, now: Millis, with_poll: bool) -> Option<(Millis, Due)> {
        let mut candidates: Vec<(Millis, Due)> = Vec::new();

        if let Some(at) = self.debounce_at {
            candidates.push((at, Due::Debounce));
        }
        if let Some(at) = self.backoff_at.front() {
            candidates.push((*at, Due::Backoff));
        }
        if let Some(at) = self.periodic_at {
            candidates.push((at, Due::Periodic));
        }
        if with_poll {
            if let Some(at) = self.poll_at {
                candidates.push((at, Due::NavigationPoll));
            }
        }
        for (i, at) in self.navigation_rescans_at.iter().enumerate() {
            candidates.push((*at, Due::NavigationRescan(i)));
        }

        // min_by_key keeps the first of equal deadlines, so ties resolve in
        // the push order above.
        candidates
            .into_iter()
            .filter(|(at, _)| *at <= now)
            .min_by_key(|(at, _)| *at)
    }
}

/// Back-to-back full passes in one batch of effects collapse into one.
fn push_full<N>(effects: &mut Vec<Effect<N>>, reason: ScanReason) {
    if !matches!(effects.last(), Some(Effect::FullScan { .. })) {
        effects.push(Effect::FullScan { reason });
    }
}

/// Next occurrence of a recurring deadline strictly after `now`. Missed
/// periods are skipped, not replayed.
fn next_after(at: Millis, period: Millis, now: Millis) -> Millis {
    if period == 0 {
        return Millis::MAX;
    }
    let mut next = at + period;
    if next <= now {
        let missed = (now - next) / period + 1;
        next += missed * period;
    }
    next
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Driver for JS hosts. Nodes are numeric handles the host assigns to the
/// element nodes it reports; effects come back as plain objects, e.g.
/// `{ type: "incrementalScan", nodes: [3, 7] }`.
#[wasm_bindgen]
pub struct DriverHandle {
    inner: ReactiveDriver<u32>,
}

#[wasm_bindgen]
impl DriverHandle {
    /// `config` may be `undefined` for the default timings.
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<DriverHandle, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            DriverConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse driver config: {}", e)))?
        };
        Ok(Self {
            inner: ReactiveDriver::new(config),
        })
    }

    #[wasm_bindgen(js_name = "start")]
    pub fn js_start(&mut self, now: f64, location: String) -> JsValue {
        to_js(&self.inner.handle(DriverEvent::Start {
            now: now as Millis,
            location,
        }))
    }

    #[wasm_bindgen(js_name = "mutations")]
    pub fn js_mutations(&mut self, now: f64, added: &[u32]) -> JsValue {
        to_js(&self.inner.handle(DriverEvent::Mutations {
            now: now as Millis,
            added: added.to_vec(),
        }))
    }

    #[wasm_bindgen(js_name = "tick")]
    pub fn js_tick(&mut self, now: f64, location: String) -> JsValue {
        to_js(&self.inner.handle(DriverEvent::Tick {
            now: now as Millis,
            location,
        }))
    }

    #[wasm_bindgen(js_name = "nextDeadline")]
    pub fn js_next_deadline(&self) -> Option<f64> {
        self.inner.next_deadline().map(|d| d as f64)
    }

    #[wasm_bindgen(js_name = "phase")]
    pub fn js_phase(&self) -> String {
        match self.inner.phase() {
            DriverPhase::Idle => "idle",
            DriverPhase::Armed => "armed",
            DriverPhase::Scanning => "scanning",
        }
        .to_string()
    }
}

fn to_js(effects: &[Effect<u32>]) -> JsValue {
    serde_wasm_bindgen::to_value(effects).unwrap_or(JsValue::NULL)
}

// =============================================================================
// Tests
// =============================================================================
