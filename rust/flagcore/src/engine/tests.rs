//! End-to-end engine scenarios over an in-memory document.

use super::*;
use crate::config::Term;
use crate::dom::{MemoryDocument, NodeId, HIGHLIGHT_CLASS, LIVE_REGION_CLASS, PAGE_MARKER_CLASS};

const HOME: &str = "https://x.com/home";

fn catalog() -> TermCatalog {
    TermCatalog::new(vec![
        Term::new("jp", "Japan")
            .with_glyph("🇯🇵")
            .with_aliases(["Japan", "Japanese"]),
        Term::new("fr", "France")
            .with_glyph("🇫🇷")
            .with_aliases(["France", "French"]),
        Term::new("td", "Chad").with_glyph("🇹🇩").with_aliases(["Chad"]),
        Term::new("pe", "Peru").with_glyph("🇵🇪").with_aliases(["Peru"]),
        Term::new("de", "Germany").with_aliases(["Germany", "German"]),
    ])
}

fn inputs(level: VerbosityLevel) -> EngineInputs {
    let settings = UserSettings {
        highlight_level: level,
        ..UserSettings::default()
    };
    EngineInputs::new(catalog(), HostAllowList::new(["x.com", "bsky.app"]), settings)
        .with_driver(DriverConfig::reactive_only())
}

fn page(paragraphs: &[&str]) -> MemoryDocument {
    let mut doc = MemoryDocument::new(HOME);
    let body = doc.body();
    for text in paragraphs {
        doc.paragraph(body, "p", text);
    }
    doc
}

/// Route engine logs to the test harness; safe to call from every test.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn launch(doc: &mut MemoryDocument, inputs: &EngineInputs) -> Engine<NodeId> {
    init_tracing();
    Engine::launch(doc, inputs, 0).unwrap().expect("engine should start")
}

fn highlights(doc: &MemoryDocument) -> Vec<(String, String, String)> {
    doc.find_by_class(HIGHLIGHT_CLASS)
        .into_iter()
        .map(|span| {
            (
                doc.text_content(span),
                doc.attribute(span, "data-country").unwrap_or_default().to_string(),
                doc.attribute(span, "data-match-type").unwrap_or_default().to_string(),
            )
        })
        .collect()
}

fn live_region_text(doc: &MemoryDocument) -> String {
    let regions = doc.find_by_class(LIVE_REGION_CLASS);
    assert_eq!(regions.len(), 1, "exactly one live region");
    doc.text_content(regions[0])
}

// -----------------------------------------------------------------------------
// Startup gate
// -----------------------------------------------------------------------------

#[test]
fn test_engine_does_not_start_on_unrecognized_host() {
    let mut doc = MemoryDocument::new("https://example.org/");
    let engine = Engine::launch(&mut doc, &inputs(VerbosityLevel::Normal), 0).unwrap();
    assert!(engine.is_none());
    assert!(doc.find_by_class(LIVE_REGION_CLASS).is_empty());
}

#[test]
fn test_engine_does_not_start_when_switched_off() {
    let mut inputs = inputs(VerbosityLevel::Normal);
    inputs.settings.extension_enabled = false;
    let mut doc = page(&["Japan"]);

    assert!(Engine::launch(&mut doc, &inputs, 0).unwrap().is_none());
    assert!(highlights(&doc).is_empty());
}

#[test]
fn test_engine_respects_disabled_platforms() {
    let mut inputs = inputs(VerbosityLevel::Normal);
    inputs.settings.enabled_platforms = Some(vec!["bsky.app".into()]);
    let mut doc = page(&["Japan"]);

    assert!(Engine::launch(&mut doc, &inputs, 0).unwrap().is_none());
}

#[test]
fn test_inputs_from_json_reports_bad_catalog() {
    let result = EngineInputs::from_json("not json", "{}", "{}");
    assert!(matches!(result, Err(crate::error::FlagError::Catalog(_))));
}

#[test]
fn test_inputs_from_json_uses_store_defaults() {
    let inputs = EngineInputs::from_json(
        r#"[{ "code": "jp", "name": "Japan", "flag": "🇯🇵", "aliases": ["Japan"] }]"#,
        r#"{ "X": "x.com" }"#,
        "{}",
    )
    .unwrap();
    let mut doc = page(&["Japan rocks"]);
    let engine = Engine::launch(&mut doc, &inputs, 0).unwrap().unwrap();

    assert_eq!(engine.level(), VerbosityLevel::Normal);
    assert_eq!(engine.index().pattern_count(), 2);
}

#[test]
fn test_unknown_stored_level_still_starts_engine() {
    let inputs = EngineInputs::from_json(
        r#"[{ "code": "jp", "name": "Japan", "aliases": ["Japan"] }]"#,
        r#"{ "X": "x.com" }"#,
        r#"{ "highlightLevel": "loud" }"#,
    )
    .unwrap();
    let mut doc = page(&["Japan"]);
    let engine = Engine::launch(&mut doc, &inputs, 0).unwrap().unwrap();

    assert_eq!(engine.level(), VerbosityLevel::Normal);
    assert_eq!(highlights(&doc).len(), 1);
}

// -----------------------------------------------------------------------------
// Full passes
// -----------------------------------------------------------------------------

#[test]
fn test_initial_pass_highlights_and_announces() {
    let mut doc = page(&["🇯🇵 trip", "I love Japanese food", "nothing here"]);
    let engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));

    assert_eq!(
        highlights(&doc),
        vec![
            ("🇯🇵".to_string(), "Japan".to_string(), "flag".to_string()),
            ("Japanese".to_string(), "Japan".to_string(), "alias".to_string()),
        ]
    );
    assert_eq!(
        live_region_text(&doc),
        "Country Highlighter found 2 country mentions: Japan"
    );
    assert_eq!(engine.stats().full_passes, 1);
    assert_eq!(engine.stats().total_highlights, 2);
    assert_eq!(engine.driver().phase(), DriverPhase::Armed);
}

#[test]
fn test_glyph_suppresses_alias_of_other_term() {
    let mut doc = page(&["French fans cheer 🇯🇵"]);
    launch(&mut doc, &inputs(VerbosityLevel::Normal));

    assert_eq!(
        highlights(&doc),
        vec![("🇯🇵".to_string(), "Japan".to_string(), "flag".to_string())]
    );
}

#[test]
fn test_second_full_pass_is_idempotent_and_clears_region() {
    let mut doc = page(&["Visit Japan today", "Chad and Chadwick", "🇫🇷🇫🇷"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    let first = highlights(&doc);
    assert_eq!(first.len(), 4);

    let report = engine.scan_full(&mut doc, None);
    assert_eq!(report.highlights, 0);
    assert_eq!(highlights(&doc), first);
    assert_eq!(report.announcement, "");
    assert_eq!(live_region_text(&doc), "");
}

#[test]
fn test_one_term_per_segment_per_pass_then_converges() {
    let mut doc = page(&["Japan and France"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    assert_eq!(highlights(&doc).len(), 1);
    assert_eq!(highlights(&doc)[0].1, "Japan");

    // The trailing literal run is ordinary text for later passes.
    let second = engine.scan_full(&mut doc, None);
    assert_eq!(second.countries, vec!["France"]);

    let third = engine.scan_full(&mut doc, None);
    assert_eq!(third.highlights, 0);
    assert!(doc.text_content(doc.body()).contains("Japan and France"));
}

#[test]
fn test_four_countries_announce_three_and_one_more() {
    let mut doc = page(&["Japan", "France", "Chad", "Peru"]);
    launch(&mut doc, &inputs(VerbosityLevel::Normal));

    assert_eq!(
        live_region_text(&doc),
        "Country Highlighter found 4 country mentions: Japan, France, Chad, and 1 more"
    );
}

#[test]
fn test_script_and_style_text_is_ignored() {
    let mut doc = MemoryDocument::new(HOME);
    let body = doc.body();
    doc.paragraph(body, "script", "var country = 'Japan';");
    doc.paragraph(body, "style", ".Japan { color: red }");
    doc.paragraph(body, "noscript", "Japan");

    let engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    assert!(highlights(&doc).is_empty());
    assert_eq!(engine.stats().total_highlights, 0);
}

#[test]
fn test_disabled_terms_are_not_highlighted() {
    let mut inputs = inputs(VerbosityLevel::Normal);
    inputs.settings.enabled_countries = Some(vec!["fr".into()]);
    let mut doc = page(&["Japan", "🇯🇵", "France"]);
    launch(&mut doc, &inputs);

    let found: Vec<String> = highlights(&doc).into_iter().map(|h| h.1).collect();
    assert_eq!(found, vec!["France"]);
}

#[test]
fn test_subtle_level_styles_spans_without_page_marker() {
    let mut doc = page(&["Japan"]);
    launch(&mut doc, &inputs(VerbosityLevel::Subtle));

    let span = doc.find_by_class(HIGHLIGHT_CLASS)[0];
    assert_eq!(doc.style(span, "text-decoration"), Some("underline"));
    assert!(doc.find_by_class(PAGE_MARKER_CLASS).is_empty());
}

// -----------------------------------------------------------------------------
// Mutation batches
// -----------------------------------------------------------------------------

#[test]
fn test_mutations_are_debounced_into_one_incremental_pass() {
    let mut doc = page(&["Japan"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    let body = doc.body();

    let (first, _) = doc.paragraph(body, "p", "Bonjour France");
    assert!(engine.on_mutations(&mut doc, 100, vec![first]).is_empty());

    let (second, loose_text) = doc.paragraph(body, "div", "Lake Chad");
    assert!(engine.on_mutations(&mut doc, 250, vec![second, loose_text]).is_empty());
    assert_eq!(engine.driver().pending_count(), 2, "text nodes are not queued");

    assert!(engine.tick(&mut doc, 549).is_empty());

    let reports = engine.tick(&mut doc, 550);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.kind, PassKind::Incremental);
    assert_eq!(report.segments_visited, 2);
    assert_eq!(report.countries, vec!["France", "Chad"]);
    assert_eq!(
        report.announcement,
        "Country Highlighter found 2 country mentions: France, Chad"
    );
}

#[test]
fn test_quiet_incremental_pass_clears_region() {
    let mut doc = page(&["Japan"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    assert_eq!(
        live_region_text(&doc),
        "Country Highlighter found 1 country mention: Japan"
    );
    let body = doc.body();

    let (p, _) = doc.paragraph(body, "p", "nothing to see");
    engine.on_mutations(&mut doc, 10, vec![p]);
    let reports = engine.tick(&mut doc, 400);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, PassKind::Incremental);
    assert_eq!(reports[0].highlights, 0);
    assert_eq!(reports[0].announcement, "");
    assert_eq!(live_region_text(&doc), "");
}

#[test]
fn test_removed_node_in_batch_is_harmless() {
    let mut doc = page(&[]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Normal));
    let body = doc.body();

    let (p, _) = doc.paragraph(body, "p", "Japan");
    engine.on_mutations(&mut doc, 10, vec![p]);
    doc.remove(&p);

    let reports = engine.tick(&mut doc, 400);
    assert_eq!(reports[0].highlights, 1, "detached subtree still has a parent element");
    assert!(highlights(&doc).is_empty(), "but nothing attached was touched");
}

// -----------------------------------------------------------------------------
// Scheduled rescans
// -----------------------------------------------------------------------------

#[test]
fn test_backoff_rescan_finds_unannounced_content() {
    let inputs = inputs(VerbosityLevel::Normal).with_driver(DriverConfig::default());
    let mut doc = page(&[]);
    let mut engine = launch(&mut doc, &inputs);

    // Streamed in without a mutation notification.
    let body = doc.body();
    doc.paragraph(body, "p", "Greetings from Peru");

    let reports = engine.tick(&mut doc, 1_000);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reason, Some(ScanReason::Backoff));
    assert_eq!(reports[0].countries, vec!["Peru"]);
}

// -----------------------------------------------------------------------------
// Page marker & soft navigation
// -----------------------------------------------------------------------------

#[test]
fn test_assertive_level_applies_single_page_marker() {
    let mut doc = page(&["Japan", "France"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Assertive));
    assert_eq!(doc.find_by_class(PAGE_MARKER_CLASS).len(), 1);

    let body = doc.body();
    doc.paragraph(body, "p", "Chad");
    engine.scan_full(&mut doc, None);
    assert_eq!(doc.find_by_class(PAGE_MARKER_CLASS).len(), 1);
}

#[test]
fn test_soft_navigation_resets_marker_and_rescans() {
    let mut doc = page(&["Japan"]);
    let mut engine = launch(&mut doc, &inputs(VerbosityLevel::Assertive));
    assert!(engine.state().page_marker.is_applied());

    doc.set_location("https://x.com/explore");
    assert!(engine.tick(&mut doc, 500).is_empty());
    assert!(doc.find_by_class(PAGE_MARKER_CLASS).is_empty());
    assert!(!engine.state().page_marker.is_applied());
    assert_eq!(engine.stats().navigations, 1);

    let body = doc.body();
    doc.paragraph(body, "p", "Vive la France");
    assert!(engine.tick(&mut doc, 1_000).is_empty());

    let reports = engine.tick(&mut doc, 1_500);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reason, Some(ScanReason::Navigation));
    assert!(reports[0].page_marker_applied);
    assert_eq!(doc.find_by_class(PAGE_MARKER_CLASS).len(), 1);
}

// -----------------------------------------------------------------------------
// Restart
// -----------------------------------------------------------------------------

#[test]
fn test_restart_rebuilds_index_and_singletons() {
    let mut doc = page(&["Japan"]);
    let engine = launch(&mut doc, &inputs(VerbosityLevel::Assertive));

    let mut changed = inputs(VerbosityLevel::Normal);
    changed.settings.enabled_countries = Some(vec!["de".into()]);
    let body = doc.body();
    doc.paragraph(body, "p", "German engineering");

    let engine = engine.restart(&mut doc, &changed, 10).unwrap().unwrap();
    assert_eq!(engine.level(), VerbosityLevel::Normal);
    assert!(doc.find_by_class(PAGE_MARKER_CLASS).is_empty());
    assert_eq!(
        live_region_text(&doc),
        "Country Highlighter found 1 country mention: Germany"
    );
    assert_eq!(highlights(&doc).len(), 2, "earlier highlights stay in the page");
}

#[test]
fn test_engines_are_independent() {
    let mut a = page(&["Japan"]);
    let mut b = page(&["France"]);
    let engine_a = launch(&mut a, &inputs(VerbosityLevel::Assertive));
    let engine_b = launch(&mut b, &inputs(VerbosityLevel::Normal));

    assert!(engine_a.state().page_marker.is_applied());
    assert!(!engine_b.state().page_marker.is_applied());
    assert_eq!(engine_a.stats().total_highlights, 1);
    assert_eq!(engine_b.stats().total_highlights, 1);
}
