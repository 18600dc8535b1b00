//! Document surface used by the engine
//!
//! The engine only needs a narrow slice of the DOM: walk children, read text
//! and class names, create the elements it owns, and swap a text node for a
//! run of new nodes. `DocumentHost` is that slice. `WebDocument` implements
//! it over the live page on wasm32; `MemoryDocument` is the arena-backed
//! implementation used for headless runs and tests.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

use std::fmt::Debug;
use std::hash::Hash;

/// Class carried by every highlight span; doubles as the idempotence marker.
pub const HIGHLIGHT_CLASS: &str = "country-highlighter-text";
/// Class of the visually hidden status region
pub const LIVE_REGION_CLASS: &str = "country-highlighter-live-region";
/// Class of the page-level viewport border
pub const PAGE_MARKER_CLASS: &str = "country-highlighter-viewport-border";

/// Containers whose text is never rendered as prose.
pub const SKIPPED_CONTAINERS: [&str; 4] = ["script", "style", "noscript", "iframe"];

pub trait DocumentHost {
    /// Node handle. Cheap to clone; equality and hash follow node identity.
    type Node: Clone + Eq + Hash + Debug;

    /// Root of the rendered content (`document.body`)
    fn body(&self) -> Self::Node;

    /// Current navigation target (`location.href`)
    fn location(&self) -> String;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    /// Lowercase tag name for elements, `None` for text nodes
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Text content of a text node, `None` for elements
    fn text(&self, node: &Self::Node) -> Option<String>;

    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn create_text(&mut self, text: &str) -> Self::Node;

    fn add_class(&mut self, node: &Self::Node, class: &str);

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Inline style with `!important` priority
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Replace all children of an element with a single text node.
    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Replace `old` in its parent with `replacements`, in order. Returns
    /// false if `old` is detached.
    fn replace_with(&mut self, old: &Self::Node, replacements: &[Self::Node]) -> bool;

    /// Detach a node from its parent. No-op if already detached.
    fn remove(&mut self, node: &Self::Node);
}
