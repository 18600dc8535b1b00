//! FlagCore: Country Name & Flag Highlighter
//!
//! A Rust/WASM core that finds mentions of countries (flag emoji or names)
//! in the text of a live page and marks them in place.
//!
//! # Architecture
//!
//! ## Config
//! - `catalog.rs` - TermCatalog / HostAllowList: shipped country and platform data
//! - `settings.rs` - UserSettings, VerbosityLevel, EnabledSet
//! - `profile.rs` - Presentation profiles per verbosity level
//! - `timing.rs` - DriverConfig: debounce, backoff and poll schedule
//!
//! ## Highlight pipeline
//! - `term_index.rs` - TermIndex: Aho-Corasick glyphs + word-bounded alias RegexSet
//! - `locator.rs` - Eligible text segments in document order
//! - `matcher.rs` - Glyph-before-alias choice, one term per segment
//! - `highlighter.rs` - Run splitting and in-place span replacement
//! - `marker.rs` - Page-level viewport border
//! - `announcer.rs` - Live-region summaries
//! - `cortex.rs` - HighlightCortex: per-segment matching for JS hosts
//!
//! ## Engine
//! - `engine/mod.rs` - Engine: passes over a `DocumentHost`
//! - `engine/driver.rs` - ReactiveDriver: when to scan (DriverHandle for JS)
//! - `engine/web.rs` - PageEngine: the engine over the live page (wasm32)
//!
//! ## Documents
//! - `dom/web.rs` - WebDocument: `DocumentHost` over `web_sys` (wasm32)
//! - `dom/memory.rs` - MemoryDocument: arena document for headless runs
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PageEngine, HighlightCortex } from 'flagcore';
//!
//! await init();
//!
//! // Whole-page engine: discovery, highlighting, page marker, live region.
//! const engine = PageEngine.launch(countriesJson, platformsJson, JSON.stringify(settings), performance.now());
//! if (engine) {
//!   new MutationObserver((records) => {
//!     engine.mutations(performance.now(), records.flatMap((r) => [...r.addedNodes]));
//!   }).observe(document.body, { childList: true, subtree: true });
//!   setInterval(() => engine.tick(performance.now()), 250);
//! }
//!
//! // Popup / options pages: lookups without touching the DOM.
//! const cortex = new HighlightCortex();
//! cortex.hydrate(countriesJson, platformsJson, JSON.stringify(settings));
//! cortex.statusLine(); // "Active • 195 countries"
//! ```

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod logging;

pub use config::*;
pub use dom::*;
pub use engine::*;
pub use error::*;
pub use highlight::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("flagcore v{}", env!("CARGO_PKG_VERSION"))
}
