//! Reactive driver timings
//!
//! All values are milliseconds on the host clock. Defaults are the timings
//! tuned for social-media pages that render in waves.

use serde::{Deserialize, Serialize};

/// Host clock timestamp, milliseconds
pub type Millis = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Quiet window after the last mutation batch before the incremental
    /// scan runs. Default: 300
    pub debounce_ms: Millis,
    /// One-shot full rescans, measured from engine start. Default: a
    /// Fibonacci-like ramp from 1s to 144s
    pub backoff_ms: Vec<Millis>,
    /// Recurring full rescan period. Default: 10 minutes
    pub periodic_ms: Millis,
    /// How often the navigation target is compared. Default: 500
    pub navigation_poll_ms: Millis,
    /// Delay between a detected soft navigation and its rescan, to let the
    /// new view render. Default: 1000
    pub navigation_settle_ms: Millis,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            backoff_ms: vec![
                1_000, 2_000, 3_000, 5_000, 8_000, 13_000, 21_000, 34_000, 55_000, 89_000,
                144_000,
            ],
            periodic_ms: 600_000,
            navigation_poll_ms: 500,
            navigation_settle_ms: 1_000,
        }
    }
}

impl DriverConfig {
    /// Short timings for demos and tests.
    pub fn fast() -> Self {
        Self {
            debounce_ms: 10,
            backoff_ms: vec![20, 40],
            periodic_ms: 1_000,
            navigation_poll_ms: 5,
            navigation_settle_ms: 10,
        }
    }

    /// No backoff schedule and no periodic rescan; only mutations and
    /// navigation trigger passes.
    pub fn reactive_only() -> Self {
        Self {
            backoff_ms: Vec::new(),
            periodic_ms: 0,
            ..Self::default()
        }
    }
}
