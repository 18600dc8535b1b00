//! WebDocument: `DocumentHost` over the live page
//!
//! Node identity comes from a `WeakMap` keyed by the DOM node itself, so the
//! same node always wraps to the same `WebNode` id and the reactive driver
//! can deduplicate queued nodes by hash. Entries die with their nodes.

use std::cell::Cell;
use std::hash::{Hash, Hasher};

use js_sys::{Object, WeakMap};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node, Window};

use super::DocumentHost;
use crate::logging;

/// A DOM node with a document-stable identity.
#[derive(Debug, Clone)]
pub struct WebNode {
    id: u32,
    node: Node,
}

impl WebNode {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl PartialEq for WebNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WebNode {}

impl Hash for WebNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub struct WebDocument {
    window: Window,
    document: Document,
    body: WebNode,
    ids: WeakMap,
    next_id: Cell<u32>,
}

impl WebDocument {
    /// The current page. `None` outside a window or before `<body>` exists.
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let body: Node = document.body()?.into();

        let mut doc = Self {
            window,
            document,
            body: WebNode { id: 0, node: body.clone() },
            ids: WeakMap::new(),
            next_id: Cell::new(0),
        };
        doc.body = doc.wrap(body);
        Some(doc)
    }

    /// Wrap a raw node, assigning it an id on first sight.
    pub fn wrap(&self, node: Node) -> WebNode {
        let key: &Object = node.unchecked_ref();
        let id = match self.ids.get(key).as_f64() {
            Some(id) => id as u32,
            None => {
                let id = self.next_id.get();
                self.next_id.set(id.wrapping_add(1));
                self.ids.set(key, &JsValue::from(id));
                id
            }
        };
        WebNode { id, node }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element<'a>(&self, node: &'a WebNode) -> Option<&'a Element> {
        node.node.dyn_ref::<Element>()
    }
}

impl DocumentHost for WebDocument {
    type Node = WebNode;

    fn body(&self) -> WebNode {
        self.body.clone()
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn children(&self, node: &WebNode) -> Vec<WebNode> {
        let list = node.node.child_nodes();
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|child| self.wrap(child))
            .collect()
    }

    fn parent_element(&self, node: &WebNode) -> Option<WebNode> {
        node.node.parent_element().map(|parent| self.wrap(parent.into()))
    }

    fn is_element(&self, node: &WebNode) -> bool {
        node.node.node_type() == Node::ELEMENT_NODE
    }

    fn tag_name(&self, node: &WebNode) -> Option<String> {
        self.element(node).map(|el| el.tag_name().to_ascii_lowercase())
    }

    fn has_class(&self, node: &WebNode, class: &str) -> bool {
        self.element(node)
            .map(|el| el.class_list().contains(class))
            .unwrap_or(false)
    }

    fn text(&self, node: &WebNode) -> Option<String> {
        if node.node.node_type() != Node::TEXT_NODE {
            return None;
        }
        node.node.node_value()
    }

    fn create_element(&mut self, tag: &str) -> WebNode {
        match self.document.create_element(tag) {
            Ok(el) => self.wrap(el.into()),
            Err(e) => {
                // Only reachable with an invalid tag name; a detached empty
                // text node keeps the caller's splice harmless.
                logging::error("WebDocument", &format!("createElement({}) failed: {:?}", tag, e));
                self.create_text("")
            }
        }
    }

    fn create_text(&mut self, text: &str) -> WebNode {
        let node: Node = self.document.create_text_node(text).into();
        self.wrap(node)
    }

    fn add_class(&mut self, node: &WebNode, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn set_attribute(&mut self, node: &WebNode, name: &str, value: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn set_style(&mut self, node: &WebNode, property: &str, value: &str) {
        if let Some(el) = node.node.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property_with_priority(property, value, "important");
        }
    }

    fn set_text_content(&mut self, node: &WebNode, text: &str) {
        node.node.set_text_content(Some(text));
    }

    fn append_child(&mut self, parent: &WebNode, child: &WebNode) {
        let _ = parent.node.append_child(&child.node);
    }

    fn replace_with(&mut self, old: &WebNode, replacements: &[WebNode]) -> bool {
        let Some(parent) = old.node.parent_node() else {
            return false;
        };
        for (inserted, node) in replacements.iter().enumerate() {
            if parent.insert_before(&node.node, Some(&old.node)).is_err() {
                for done in &replacements[..inserted] {
                    let _ = parent.remove_child(&done.node);
                }
                return false;
            }
        }
        parent.remove_child(&old.node).is_ok()
    }

    fn remove(&mut self, node: &WebNode) {
        if let Some(parent) = node.node.parent_node() {
            let _ = parent.remove_child(&node.node);
        }
    }
}
