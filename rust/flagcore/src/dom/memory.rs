//! MemoryDocument: arena-backed document tree
//!
//! Nodes are never freed; detached nodes simply lose their parent link.
//! That keeps `NodeId`s stable for the lifetime of the document, which is
//! what the reactive driver relies on when it queues added nodes.

use serde::{Deserialize, Serialize};

use super::DocumentHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attributes: Vec<(String, String)>,
        styles: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    body: NodeId,
    location: String,
}

impl MemoryDocument {
    pub fn new(location: impl Into<String>) -> Self {
        let body = NodeData {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                classes: Vec::new(),
                attributes: Vec::new(),
                styles: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            location: location.into(),
        }
    }

    /// Simulate an in-page navigation.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Create an element and append it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(&parent, &id);
        id
    }

    /// Create a text node and append it to `parent`.
    pub fn text_node(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(&parent, &id);
        id
    }

    /// `<tag>text</tag>` appended to `parent`; returns (element, text node).
    pub fn paragraph(&mut self, parent: NodeId, tag: &str, text: &str) -> (NodeId, NodeId) {
        let el = self.element(parent, tag);
        let tn = self.text_node(el, text);
        (el, tn)
    }

    /// Overwrite a text node in place (a text mutation, not a child-list one).
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(NodeData { kind: NodeKind::Text(t), .. }) = self.nodes.get_mut(node.0) {
            *t = text.to_string();
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { styles, .. } => styles
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Concatenated text of the subtree, like `Node.textContent`.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            if self.has_class(&node, class) {
                found.push(node);
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        found
    }

    /// Whether the node is reachable from `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }
}

impl DocumentHost for MemoryDocument {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn parent_element(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn is_element(&self, node: &NodeId) -> bool {
        matches!(
            self.nodes.get(node.0).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Element { classes, .. }) => classes.iter().any(|c| c == class),
            _ => false,
        }
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(t) => Some(t.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                classes: Vec::new(),
                attributes: Vec::new(),
                styles: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.push(NodeData {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(NodeData { kind: NodeKind::Element { classes, .. }, .. }) = self.nodes.get_mut(node.0) {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(NodeData { kind: NodeKind::Element { attributes, .. }, .. }) = self.nodes.get_mut(node.0) {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        if let Some(NodeData { kind: NodeKind::Element { styles, .. }, .. }) = self.nodes.get_mut(node.0) {
            match styles.iter_mut().find(|(k, _)| k == property) {
                Some((_, v)) => *v = value.to_string(),
                None => styles.push((property.to_string(), value.to_string())),
            }
        }
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        if !self.is_element(node) {
            self.set_text(*node, text);
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        if !text.is_empty() {
            let tn = self.create_text(text);
            self.append_child(node, &tn);
        }
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        self.detach(*child);
        self.nodes[child.0].parent = Some(*parent);
        self.nodes[parent.0].children.push(*child);
    }

    fn replace_with(&mut self, old: &NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.nodes.get(old.0).and_then(|n| n.parent) else {
            return false;
        };
        let Some(position) = self.nodes[parent.0].children.iter().position(|c| c == old) else {
            return false;
        };

        self.nodes[parent.0].children.remove(position);
        self.nodes[old.0].parent = None;

        for (offset, node) in replacements.iter().enumerate() {
            self.detach(*node);
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(position + offset, *node);
        }
        true
    }

    fn remove(&mut self, node: &NodeId) {
        if node.0 < self.nodes.len() {
            self.detach(*node);
        }
    }
}
