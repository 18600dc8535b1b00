//! Accessibility announcer
//!
//! One visually hidden `role="status"` region per document, created on first
//! use. Each scan pass overwrites its text with a summary of what that pass
//! found; a pass that found nothing clears it.

use crate::config::VerbosityLevel;
use crate::dom::{DocumentHost, LIVE_REGION_CLASS};

/// Names listed before the "and N more" tail
const MAX_LISTED: usize = 3;

/// Compose the sentence for one pass. `names` are distinct display names in
/// discovery order.
pub fn compose_announcement(count: usize, names: &[String]) -> String {
    if count == 0 || names.is_empty() {
        return String::new();
    }
    if count == 1 {
        return format!("Country Highlighter found 1 country mention: {}", names[0]);
    }

    let listed = &names[..names.len().min(MAX_LISTED)];
    let remaining = names.len() - listed.len();
    let list = listed.join(", ");

    if remaining > 0 {
        format!(
            "Country Highlighter found {} country mentions: {}, and {} more",
            count, list, remaining
        )
    } else {
        format!("Country Highlighter found {} country mentions: {}", count, list)
    }
}

#[derive(Debug, Clone)]
pub struct Announcer<N> {
    region: Option<N>,
}

impl<N> Default for Announcer<N> {
    fn default() -> Self {
        Self { region: None }
    }
}

impl<N: Clone + PartialEq + std::fmt::Debug> Announcer<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Option<&N> {
        self.region.as_ref()
    }

    /// Write the summary for one pass. Returns the announced text.
    pub fn announce<D>(&mut self, doc: &mut D, level: VerbosityLevel, count: usize, names: &[String]) -> String
    where
        D: DocumentHost<Node = N>,
    {
        let region = self.ensure_region(doc, level);
        let message = compose_announcement(count, names);
        doc.set_text_content(&region, &message);
        message
    }

    fn ensure_region<D>(&mut self, doc: &mut D, level: VerbosityLevel) -> N
    where
        D: DocumentHost<Node = N>,
    {
        if let Some(region) = &self.region {
            return region.clone();
        }

        let region = doc.create_element("div");
        doc.set_attribute(&region, "role", "status");
        doc.set_attribute(&region, "aria-live", level.live_politeness());
        doc.set_attribute(&region, "aria-atomic", "true");
        doc.add_class(&region, LIVE_REGION_CLASS);
        for (property, value) in [
            ("position", "absolute"),
            ("left", "-10000px"),
            ("width", "1px"),
            ("height", "1px"),
            ("overflow", "hidden"),
        ] {
            doc.set_style(&region, property, value);
        }
        let body = doc.body();
        doc.append_child(&body, &region);

        self.region = Some(region.clone());
        region
    }

    /// Detach the region; used when the engine is restarted on the same page.
    pub fn remove<D>(&mut self, doc: &mut D)
    where
        D: DocumentHost<Node = N>,
    {
        if let Some(region) = self.region.take() {
            doc.remove(&region);
        }
    }
}
