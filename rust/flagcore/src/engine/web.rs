//! PageEngine: the engine bound to the live page
//!
//! The content script only forwards what the browser tells it: the
//! MutationObserver's added nodes and a clock tick. Every pass (text
//! discovery, splicing, page marker, live region) runs in here.
//!
//! ```javascript,ignore
//! const engine = PageEngine.launch(countries, platforms, settings, performance.now());
//! if (engine) {
//!   new MutationObserver((records) => {
//!     const added = records.flatMap((r) => [...r.addedNodes]);
//!     engine.mutations(performance.now(), added);
//!   }).observe(document.body, { childList: true, subtree: true });
//!   setInterval(() => engine.tick(performance.now()), 250);
//! }
//! ```

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{Engine, EngineInputs};
use crate::config::{DriverConfig, Millis};
use crate::dom::{WebDocument, WebNode};
use crate::logging;

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    match value.serialize(&serializer) {
        Ok(v) => v,
        Err(e) => {
            logging::error("PageEngine", &format!("Serialization failed: {:?}", e));
            JsValue::NULL
        }
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct PageEngine {
    doc: WebDocument,
    engine: Engine<WebNode>,
}

impl PageEngine {
    pub fn launch(inputs: &EngineInputs, now: Millis) -> Result<Option<PageEngine>, JsValue> {
        let Some(mut doc) = WebDocument::current() else {
            logging::warn("PageEngine", "No document body yet");
            return Ok(None);
        };
        let engine = Engine::launch(&mut doc, inputs, now).map_err(to_js_error)?;
        Ok(engine.map(|engine| PageEngine { doc, engine }))
    }

    pub fn engine(&self) -> &Engine<WebNode> {
        &self.engine
    }
}

#[wasm_bindgen]
impl PageEngine {
    /// Gate, compile and run the initial pass. `null` when the engine must
    /// not run on this page. `driver` may be `undefined` for the default
    /// timings.
    #[wasm_bindgen(js_name = launch)]
    pub fn js_launch(
        catalog: &str,
        platforms: &str,
        settings: &str,
        now: f64,
        driver: JsValue,
    ) -> Result<Option<PageEngine>, JsValue> {
        let mut inputs = EngineInputs::from_json(catalog, platforms, settings).map_err(to_js_error)?;
        if !driver.is_undefined() && !driver.is_null() {
            let config: DriverConfig = serde_wasm_bindgen::from_value(driver)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse driver config: {}", e)))?;
            inputs = inputs.with_driver(config);
        }
        Self::launch(&inputs, now as Millis)
    }

    /// One MutationObserver batch (any nodes; non-elements are dropped).
    /// Returns the scan reports of any pass that came due.
    #[wasm_bindgen(js_name = mutations)]
    pub fn js_mutations(&mut self, now: f64, added: Array) -> JsValue {
        let added: Vec<WebNode> = added
            .iter()
            .filter_map(|value| value.dyn_into::<web_sys::Node>().ok())
            .map(|node| self.doc.wrap(node))
            .collect();
        to_js(&self.engine.on_mutations(&mut self.doc, now as Millis, added))
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn js_tick(&mut self, now: f64) -> JsValue {
        to_js(&self.engine.tick(&mut self.doc, now as Millis))
    }

    /// Full pass outside the schedule
    #[wasm_bindgen(js_name = scan)]
    pub fn js_scan(&mut self) -> JsValue {
        to_js(&self.engine.scan_full(&mut self.doc, None))
    }

    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn js_next_deadline(&self) -> Option<f64> {
        self.engine.driver().next_deadline().map(|d| d as f64)
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn js_stats(&self) -> JsValue {
        to_js(self.engine.stats())
    }

    /// Remove the live region and page marker. Highlights stay.
    #[wasm_bindgen(js_name = teardown)]
    pub fn js_teardown(&mut self) {
        self.engine.teardown(&mut self.doc);
    }
}
