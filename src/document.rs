//! Document abstraction scanned by the activator, plus an in-memory implementation.

use std::fmt::Debug;
use std::hash::Hash;

/// Capabilities the activator needs from a rendered document.
pub trait ImageDocument {
    /// Stable handle identifying an element for the lifetime of the document.
    type Handle: Copy + Eq + Hash + Debug;

    /// Every element carrying the `attribute`, in document order.
    fn query_attribute(&self, attribute: &str) -> Vec<Self::Handle>;

    /// Current value of an attribute, if present.
    fn attribute(&self, handle: Self::Handle, name: &str) -> Option<String>;

    /// Set or replace an attribute value.
    fn set_attribute(&mut self, handle: Self::Handle, name: &str, value: &str);

    /// Make the element visible through its inline style.
    fn reveal(&mut self, handle: Self::Handle);

    /// Remove the sibling elements whose class list contains `class`, returning how many.
    fn remove_sibling_indicators(&mut self, handle: Self::Handle, class: &str) -> usize;
}

/// Handle of a node stored in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

const VOID_ELEMENTS: &[&str] = &["area", "br", "hr", "img", "input", "link", "meta", "source"];

/// Arena-backed element tree implementing [`ImageDocument`].
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty document holding only its root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    /// Root node every element descends from.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new element under `parent`.
    ///
    /// A parent handle this document never issued leaves the new element detached.
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Element(Element {
                tag_name: tag_name.to_ascii_lowercase(),
                attributes: Vec::new(),
                styles: Vec::new(),
            }),
        )
    }

    /// Append a text node under `parent`, detached when the parent is unknown.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Builder-style attribute assignment returning the same node.
    pub fn with_attribute(&mut self, node: NodeId, name: &str, value: &str) -> NodeId {
        self.set_attribute(node, name, value);
        node
    }

    /// Tag name of an element, lowercased.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag_name.as_str())
    }

    /// Inline style property value, if set.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).and_then(|element| {
            element
                .styles
                .iter()
                .find(|(name, _)| name == property)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            upsert(&mut element.styles, property, value);
        }
    }

    /// Whether the element's class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self
            .element(node)
            .and_then(|element| {
                element
                    .attributes
                    .iter()
                    .find(|(name, _)| name == "class")
                    .map(|(_, value)| value.split_whitespace().any(|entry| entry == class))
            })
            .unwrap_or(false)
    }

    /// Parent of a node, `None` for the root and detached nodes.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|entry| entry.parent)
    }

    /// Children of a node in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self
            .nodes
            .get(node.0)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the node is still attached below the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Detach a node and its subtree from the document.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root() {
            return;
        }
        if let Some(parent) = self.parent(node) {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
        if let Some(entry) = self.nodes.get_mut(node.0) {
            entry.parent = None;
        }
    }

    /// Serialise the attached tree as HTML, merging inline styles into a `style` attribute.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = match self.nodes.get_mut(parent.0) {
            Some(entry) => {
                entry.children.push(id);
                Some(parent)
            }
            None => None,
        };
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match self.nodes.get(node.0).map(|entry| &entry.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(node.0).map(|entry| &mut entry.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn collect_elements(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.element(*child).is_some() {
                out.push(*child);
            }
            self.collect_elements(*child, out);
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => {}
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                for (name, value) in &element.attributes {
                    if name == "style" && !element.styles.is_empty() {
                        continue;
                    }
                    out.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
                }
                if !element.styles.is_empty() {
                    let declarations: Vec<String> = element
                        .styles
                        .iter()
                        .map(|(name, value)| format!("{name}: {value}"))
                        .collect();
                    out.push_str(&format!(" style=\"{}\"", escape(&declarations.join("; "), true)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
                    return;
                }
                for child in self.children(node) {
                    self.write_node(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag_name));
            }
        }
    }
}

impl ImageDocument for Dom {
    type Handle = NodeId;

    fn query_attribute(&self, attribute: &str) -> Vec<NodeId> {
        let mut elements = Vec::new();
        self.collect_elements(self.root(), &mut elements);
        elements.retain(|node| self.attribute(*node, attribute).is_some());
        elements
    }

    fn attribute(&self, handle: NodeId, name: &str) -> Option<String> {
        self.element(handle).and_then(|element| {
            element
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
    }

    fn set_attribute(&mut self, handle: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(handle) {
            upsert(&mut element.attributes, name, value);
        }
    }

    fn reveal(&mut self, handle: NodeId) {
        self.set_style(handle, "display", "block");
        self.set_style(handle, "visibility", "visible");
        self.set_style(handle, "opacity", "1");
    }

    fn remove_sibling_indicators(&mut self, handle: NodeId, class: &str) -> usize {
        let Some(parent) = self.parent(handle) else {
            return 0;
        };
        let indicators: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|sibling| *sibling != handle && self.has_class(*sibling, class))
            .collect();
        for indicator in &indicators {
            self.remove(*indicator);
        }
        indicators.len()
    }
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    match entries.iter_mut().find(|(key, _)| key == name) {
        Some((_, existing)) => *existing = value.to_string(),
        None => entries.push((name.to_string(), value.to_string())),
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
