//! Node storage types for the document arena.

use std::fmt;

use indexmap::IndexMap;

use super::event::EventListener;

// =============================================================================
// Node Identity
// =============================================================================

/// Handle to a node in a [`Document`](super::Document).
///
/// Slots are reused after a node is released; the generation makes a stale
/// handle miss instead of aliasing the node that took its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Slot index inside the arena.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// What kind of node a [`NodeId`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

// =============================================================================
// Node Data
// =============================================================================

/// Tag node payload: attributes, class, inline style and listeners.
#[derive(Default)]
pub(crate) struct ElementData {
    pub tag: String,
    pub class_name: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub style: IndexMap<String, String>,
    pub listeners: Vec<(String, EventListener)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }
}

pub(crate) enum NodeContent {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

impl NodeContent {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeContent::Element(_) => NodeKind::Element,
            NodeContent::Text(_) => NodeKind::Text,
            NodeContent::Comment(_) => NodeKind::Comment,
            NodeContent::Fragment => NodeKind::Fragment,
        }
    }

    /// Only elements and fragments accept children.
    pub fn accepts_children(&self) -> bool {
        matches!(self, NodeContent::Element(_) | NodeContent::Fragment)
    }
}

pub(crate) struct NodeData {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub content: NodeContent,
}

impl NodeData {
    pub fn new(content: NodeContent) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            content,
        }
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.content {
            NodeContent::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.content {
            NodeContent::Element(data) => Some(data),
            _ => None,
        }
    }
}

// =============================================================================
// Name Validation
// =============================================================================

/// Check a tag or attribute name.
///
/// Accepts an ASCII letter (or `_` / `:` for attributes) followed by ASCII
/// alphanumerics, `-`, `_`, `:` or `.`.
pub(crate) fn is_valid_name(name: &str, allow_leading_punct: bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let first_ok = first.is_ascii_alphabetic() || (allow_leading_punct && matches!(first, '_' | ':'));
    first_ok && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names() {
        assert!(is_valid_name("div", false));
        assert!(is_valid_name("my-widget", false));
        assert!(is_valid_name("svg:path", false));
        assert!(!is_valid_name("", false));
        assert!(!is_valid_name("1div", false));
        assert!(!is_valid_name("di v", false));
        assert!(!is_valid_name("<div>", false));
        assert!(!is_valid_name("_x", false));
    }

    #[test]
    fn test_attribute_names() {
        assert!(is_valid_name("data-id", true));
        assert!(is_valid_name("_private", true));
        assert!(is_valid_name("xlink:href", true));
        assert!(!is_valid_name("a b", true));
        assert!(!is_valid_name("=", true));
    }

    #[test]
    fn test_node_id_display() {
        let id = NodeId { index: 7, generation: 2 };
        assert_eq!(id.to_string(), "#7");
        assert_eq!(id.index(), 7);
    }
}
