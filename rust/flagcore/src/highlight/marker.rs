//! Page-level marker: a fixed, full-viewport border shown once a page has
//! at least one highlight, for levels that define a page profile.

use crate::config::StyleProfile;
use crate::dom::{DocumentHost, PAGE_MARKER_CLASS};

/// Create-once / remove-on-reset handle to the viewport border.
#[derive(Debug, Clone)]
pub struct PageMarker<N> {
    element: Option<N>,
    applied: bool,
}

impl<N> Default for PageMarker<N> {
    fn default() -> Self {
        Self {
            element: None,
            applied: false,
        }
    }
}

impl<N: Clone + PartialEq + std::fmt::Debug> PageMarker<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn element(&self) -> Option<&N> {
        self.element.as_ref()
    }

    /// Apply the border if `page_style` is defined and none exists yet.
    /// Returns true only when a new element was created.
    pub fn apply<D>(&mut self, doc: &mut D, page_style: Option<&StyleProfile>) -> bool
    where
        D: DocumentHost<Node = N>,
    {
        if self.applied || self.element.is_some() {
            return false;
        }
        let Some(page_style) = page_style else {
            return false;
        };

        let fixed = StyleProfile::new()
            .with("position", "fixed")
            .with("top", "0")
            .with("left", "0")
            .with("right", "0")
            .with("bottom", "0")
            .with("pointer-events", "none")
            .with("z-index", "2147483647")
            .merged(page_style);

        let border = doc.create_element("div");
        doc.add_class(&border, PAGE_MARKER_CLASS);
        doc.set_attribute(&border, "aria-hidden", "true");
        for (property, value) in fixed.iter() {
            doc.set_style(&border, property, value);
        }
        let body = doc.body();
        doc.append_child(&body, &border);

        self.element = Some(border);
        self.applied = true;
        true
    }

    /// Remove the border (soft navigation). Returns true if one was removed.
    pub fn reset<D>(&mut self, doc: &mut D) -> bool
    where
        D: DocumentHost<Node = N>,
    {
        self.applied = false;
        match self.element.take() {
            Some(border) => {
                doc.remove(&border);
                true
            }
            None => false,
        }
    }
}
