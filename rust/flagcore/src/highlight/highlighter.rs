//! Highlighter: split a matched segment into runs and swap it in place
//!
//! Every occurrence of the chosen pattern in the segment is marked, not just
//! the first. Siblings of the segment are left untouched.

use serde::Serialize;

use super::matcher::SegmentMatch;
use super::term_index::MatchKind;
use crate::config::StyleProfile;
use crate::dom::{DocumentHost, HIGHLIGHT_CLASS};

/// A piece of the original segment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Run {
    Literal { text: String },
    Marked { text: String, term: String, kind: MatchKind },
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Literal { text } | Run::Marked { text, .. } => text,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, Run::Marked { .. })
    }
}

/// Split `text` around every occurrence of the matched pattern.
/// Concatenating the runs reproduces `text` exactly.
pub fn split_runs(text: &str, matched: &SegmentMatch<'_>) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut last = 0;

    for range in matched.entry.find_all(text) {
        if range.start > last {
            runs.push(Run::Literal {
                text: text[last..range.start].to_string(),
            });
        }
        runs.push(Run::Marked {
            text: text[range.clone()].to_string(),
            term: matched.term_name().to_string(),
            kind: matched.kind(),
        });
        last = range.end;
    }

    if last < text.len() {
        runs.push(Run::Literal {
            text: text[last..].to_string(),
        });
    }
    runs
}

/// Replace `segment` with literal text nodes and highlight spans.
///
/// Returns false, leaving the document untouched, when the segment has lost
/// its container, already sits inside a highlight, or no longer contains the
/// pattern (its text changed since discovery).
pub fn highlight_segment<D: DocumentHost>(
    doc: &mut D,
    segment: &D::Node,
    matched: &SegmentMatch<'_>,
    style: &StyleProfile,
) -> bool {
    let Some(parent) = doc.parent_element(segment) else {
        return false;
    };
    if doc.has_class(&parent, HIGHLIGHT_CLASS) {
        return false;
    }
    let Some(text) = doc.text(segment) else {
        return false;
    };

    let runs = split_runs(&text, matched);
    if !runs.iter().any(Run::is_marked) {
        return false;
    }

    let nodes: Vec<D::Node> = runs.iter().map(|run| render_run(doc, run, style)).collect();
    doc.replace_with(segment, &nodes)
}

fn render_run<D: DocumentHost>(doc: &mut D, run: &Run, style: &StyleProfile) -> D::Node {
    match run {
        Run::Literal { text } => doc.create_text(text),
        Run::Marked { text, term, kind } => {
            let span = doc.create_element("span");
            doc.add_class(&span, HIGHLIGHT_CLASS);
            doc.set_attribute(&span, "data-country", term);
            doc.set_attribute(&span, "data-match-type", kind.as_str());
            for (property, value) in style.iter() {
                doc.set_style(&span, property, value);
            }
            let inner = doc.create_text(text);
            doc.append_child(&span, &inner);
            span
        }
    }
}
