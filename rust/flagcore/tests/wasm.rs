//! JS-facing bindings, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use flagcore::{DriverHandle, HighlightCortex, PageEngine};
use js_sys::{Array, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const CATALOG: &str = r#"[
    { "code": "jp", "name": "Japan", "flag": "🇯🇵", "aliases": ["Japan", "Japanese"] },
    { "code": "fr", "name": "France", "flag": "🇫🇷", "aliases": ["France", "French"] }
]"#;

const PLATFORMS: &str = r#"{ "X": "x.com", "Bluesky": "bsky.app" }"#;

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

fn cortex(settings: &str) -> HighlightCortex {
    let mut cortex = HighlightCortex::js_new();
    cortex.js_hydrate(CATALOG, PLATFORMS, settings).unwrap();
    cortex
}

#[wasm_bindgen_test]
fn test_version_names_crate() {
    assert!(flagcore::version().starts_with("flagcore v"));
}

#[wasm_bindgen_test]
fn test_match_text_returns_plain_object() {
    let cortex = cortex("{}");
    let m = cortex.js_match_text("French fans cheer 🇯🇵");

    assert_eq!(field(&m, "termName").as_string().as_deref(), Some("Japan"));
    assert_eq!(field(&m, "kind").as_string().as_deref(), Some("flag"));
    assert!(cortex.js_match_text("nothing").is_null());

    // Offsets index the JS string, not the UTF-8 bytes.
    let text = "🇦🇶 Japanese";
    let m = cortex.js_match_text(text);
    let start = field(&m, "start").as_f64().unwrap() as u32;
    let end = field(&m, "end").as_f64().unwrap() as u32;
    let js_text = js_sys::JsString::from(text);
    assert_eq!(String::from(js_text.substring(start, end)), "Japanese");
}

#[wasm_bindgen_test]
fn test_runs_are_tagged_objects() {
    let cortex = cortex("{}");
    let runs = Array::from(&cortex.js_runs("Visit Japan today"));

    assert_eq!(runs.length(), 3);
    assert_eq!(field(&runs.get(0), "type").as_string().as_deref(), Some("literal"));
    assert_eq!(field(&runs.get(1), "type").as_string().as_deref(), Some("marked"));
    assert_eq!(field(&runs.get(1), "text").as_string().as_deref(), Some("Japan"));
}

#[wasm_bindgen_test]
fn test_styles_follow_level() {
    let normal = cortex("{}");
    assert_eq!(
        field(&normal.js_text_style(), "background-color").as_string().as_deref(),
        Some("#fef08a")
    );
    assert!(normal.js_page_style().is_null());

    let assertive = cortex(r#"{ "highlightLevel": "assertive" }"#);
    assert_eq!(assertive.js_live_politeness(), "assertive");
    assert_eq!(
        field(&assertive.js_page_style(), "opacity").as_string().as_deref(),
        Some(".5")
    );
}

#[wasm_bindgen_test]
fn test_hydrate_rejects_bad_json() {
    let mut cortex = HighlightCortex::js_new();
    assert!(cortex.js_hydrate("[", PLATFORMS, "{}").is_err());
    assert!(cortex.js_allows_location("nope").is_err());
}

#[wasm_bindgen_test]
fn test_driver_handle_schedules_scans() {
    let mut driver = DriverHandle::js_new(JsValue::UNDEFINED).unwrap();
    assert_eq!(driver.js_phase(), "idle");

    let effects = Array::from(&driver.js_start(0.0, "https://x.com/home".into()));
    assert_eq!(effects.length(), 1);
    assert_eq!(field(&effects.get(0), "type").as_string().as_deref(), Some("fullScan"));
    assert_eq!(field(&effects.get(0), "reason").as_string().as_deref(), Some("initial"));

    assert_eq!(Array::from(&driver.js_mutations(10.0, &[4, 9, 4])).length(), 0);
    let effects = Array::from(&driver.js_tick(310.0, "https://x.com/home".into()));
    assert_eq!(effects.length(), 1);
    assert_eq!(
        field(&effects.get(0), "type").as_string().as_deref(),
        Some("incrementalScan")
    );
    assert_eq!(Array::from(&field(&effects.get(0), "nodes")).length(), 2);
}

// -----------------------------------------------------------------------------
// PageEngine over the live document
// -----------------------------------------------------------------------------

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn paragraph(body: &HtmlElement, text: &str) -> Element {
    let p = document().create_element("p").unwrap();
    p.set_text_content(Some(text));
    body.append_child(&p).unwrap();
    p
}

#[wasm_bindgen_test]
fn test_page_engine_highlights_real_paragraph() {
    let document = document();
    let body = document.body().unwrap();
    let first = paragraph(&body, "Visit Japan today");

    let host = web_sys::window().unwrap().location().hostname().unwrap();
    let platforms = format!(r#"{{ "Test": "{}" }}"#, host);
    let mut engine = PageEngine::js_launch(CATALOG, &platforms, "{}", 0.0, JsValue::UNDEFINED)
        .unwrap()
        .expect("test host is allowed");

    let spans = first.query_selector_all(".country-highlighter-text").unwrap();
    assert_eq!(spans.length(), 1);
    let span: Element = spans.get(0).unwrap().dyn_into().unwrap();
    assert_eq!(span.get_attribute("data-country").as_deref(), Some("Japan"));
    assert_eq!(span.get_attribute("data-match-type").as_deref(), Some("alias"));
    assert_eq!(first.text_content().as_deref(), Some("Visit Japan today"));

    let region = document
        .query_selector(".country-highlighter-live-region")
        .unwrap()
        .unwrap();
    assert_eq!(
        region.text_content().as_deref(),
        Some("Country Highlighter found 1 country mention: Japan")
    );

    // A node added later is picked up once the debounce window closes.
    let second = paragraph(&body, "Vive la France");
    let added = Array::of1(&second);
    assert_eq!(Array::from(&engine.js_mutations(10.0, added)).length(), 0);
    let reports = Array::from(&engine.js_tick(400.0));
    assert_eq!(reports.length(), 1);
    assert_eq!(field(&reports.get(0), "kind").as_string().as_deref(), Some("incremental"));
    assert_eq!(
        second.query_selector(".country-highlighter-text").unwrap().unwrap().text_content().as_deref(),
        Some("France")
    );

    engine.js_teardown();
    assert!(document
        .query_selector(".country-highlighter-live-region")
        .unwrap()
        .is_none());
    first.remove();
    second.remove();
}

#[wasm_bindgen_test]
fn test_page_engine_declines_unlisted_host() {
    let engine = PageEngine::js_launch(
        CATALOG,
        r#"{ "X": "x.com" }"#,
        "{}",
        0.0,
        JsValue::UNDEFINED,
    )
    .unwrap();
    assert!(engine.is_none());
}
