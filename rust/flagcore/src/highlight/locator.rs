//! Text segment locator
//!
//! Depth-first walk collecting eligible text nodes in document order. The
//! result is a fresh snapshot per call; nothing is held across mutations.

use crate::dom::{DocumentHost, HIGHLIGHT_CLASS, LIVE_REGION_CLASS, SKIPPED_CONTAINERS};

/// Eligible text nodes under `root` (inclusive), in document order.
pub fn text_segments<D: DocumentHost>(doc: &D, root: &D::Node) -> Vec<D::Node> {
    let mut segments = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if doc.is_element(&node) {
            for child in doc.children(&node).into_iter().rev() {
                stack.push(child);
            }
        } else if is_eligible(doc, &node) {
            segments.push(node);
        }
    }
    segments
}

/// Exclusion rules for a single text node.
pub fn is_eligible<D: DocumentHost>(doc: &D, node: &D::Node) -> bool {
    let Some(text) = doc.text(node) else {
        return false;
    };
    let Some(parent) = doc.parent_element(node) else {
        return false;
    };

    if let Some(tag) = doc.tag_name(&parent) {
        if SKIPPED_CONTAINERS.contains(&tag.as_str()) {
            return false;
        }
    }
    // Our own output: existing highlights and the announcement text.
    if doc.has_class(&parent, HIGHLIGHT_CLASS) || doc.has_class(&parent, LIVE_REGION_CLASS) {
        return false;
    }
    !text.trim().is_empty()
}
