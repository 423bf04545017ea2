//! Document - the live node tree that descriptors materialize into.
//!
//! Nodes are slots in an arena owned by the [`Document`]; callers hold
//! [`NodeId`] handles. The surface mirrors the small part of a browser DOM the
//! runtime needs:
//! - Creation: elements, text nodes, comment placeholders, fragments
//! - Attachment: append (fragments dissolve into the parent), remove, replace
//! - Properties: attributes, class, inline style
//! - Events: listeners and synchronous bubbling dispatch
//! - Inspection: children, text content, tag lookup, HTML serialization
//!
//! # Example
//!
//! ```ignore
//! let doc = Document::new();
//! let root = doc.create_element("div")?;
//! let text = doc.create_text_node("hello");
//! doc.append_child(root, text)?;
//! assert_eq!(doc.outer_html(root), "<div>hello</div>");
//! ```

mod event;
mod node;
mod serialize;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

pub use event::{Event, EventListener};
pub use node::{NodeId, NodeKind};

use node::{is_valid_name, ElementData, NodeContent, NodeData};

use crate::error::{DomError, DomResult};

// =============================================================================
// Arena
// =============================================================================

struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

#[derive(Default)]
struct Tree {
    slots: Vec<Slot>,
    /// Pool of freed slot indices for reuse.
    free: Vec<u32>,
    /// Latest claim token per render container.
    claims: HashMap<NodeId, u64>,
    next_claim: u64,
}

impl Tree {
    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> DomResult<&NodeData> {
        self.get(id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.get_mut(id).ok_or(DomError::NodeNotFound(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    fn insert(&mut self, content: NodeContent) -> NodeId {
        let data = NodeData::new(content);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(data);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(data),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn detach(&mut self, child: NodeId) {
        let parent = self.get_mut(child).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|c| *c != child);
        }
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).and_then(|node| node.parent);
        }
        false
    }

    /// Free a node and its whole subtree. Listeners are dropped afterwards,
    /// outside the tree borrow, by the caller holding the returned data.
    fn free_subtree(&mut self, root: NodeId) -> Vec<NodeData> {
        self.detach(root);
        let mut freed = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index as usize)
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            let Some(data) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.claims.remove(&id);
            stack.extend(data.children.iter().copied());
            freed.push(data);
        }
        freed
    }
}

// =============================================================================
// Document
// =============================================================================

/// Shared handle to a node tree. Cloning shares the same tree.
#[derive(Clone, Default)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when both handles share one tree.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Create a detached element.
    ///
    /// Fails with [`DomError::InvalidTagName`] for names that are not
    /// element names (empty, leading digit, whitespace, markup characters).
    pub fn create_element(&self, tag: &str) -> DomResult<NodeId> {
        if !is_valid_name(tag, false) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        Ok(self
            .tree
            .borrow_mut()
            .insert(NodeContent::Element(ElementData::new(tag))))
    }

    pub fn create_text_node(&self, text: impl Into<String>) -> NodeId {
        self.tree.borrow_mut().insert(NodeContent::Text(text.into()))
    }

    pub fn create_comment(&self, text: impl Into<String>) -> NodeId {
        self.tree.borrow_mut().insert(NodeContent::Comment(text.into()))
    }

    /// Create a fragment. Appending a fragment moves its children instead.
    pub fn create_fragment(&self) -> NodeId {
        self.tree.borrow_mut().insert(NodeContent::Fragment)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Check whether `node` is alive in this document.
    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.borrow().get(node).is_some()
    }

    pub fn kind(&self, node: NodeId) -> DomResult<NodeKind> {
        Ok(self.tree.borrow().node(node)?.content.kind())
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?.element().map(|el| el.tag.clone())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node)?.parent
    }

    /// Direct children, empty for missing nodes.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Children that are elements (skips text and placeholders).
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let Some(data) = tree.get(node) else {
            return Vec::new();
        };
        data.children
            .iter()
            .copied()
            .filter(|c| tree.get(*c).is_some_and(|n| n.element().is_some()))
            .collect()
    }

    /// Concatenated text of the node and its descendants.
    ///
    /// Comments contribute nothing unless `node` itself is a comment.
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.tree.borrow();
        let Some(data) = tree.get(node) else {
            return String::new();
        };
        match &data.content {
            NodeContent::Text(text) | NodeContent::Comment(text) => text.clone(),
            _ => {
                let mut out = String::new();
                collect_text(&tree, data, &mut out);
                out
            }
        }
    }

    /// Descendant elements with tag `tag`, in document order.
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = tree
            .get(root)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(node) = tree.get(id) else { continue };
            if node.element().is_some_and(|el| el.tag.eq_ignore_ascii_case(tag)) {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.tree
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.node.is_some())
            .count()
    }

    // -------------------------------------------------------------------------
    // Attachment
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`.
    ///
    /// A fragment child moves all of its children instead and is left empty.
    /// A child that already has a parent is moved.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let mut tree = self.tree.borrow_mut();
        if !tree.node(parent)?.content.accepts_children() {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let child_kind = tree.node(child)?.content.kind();
        if tree.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let moved = if child_kind == NodeKind::Fragment {
            std::mem::take(&mut tree.node_mut(child)?.children)
        } else {
            tree.detach(child);
            vec![child]
        };
        for id in &moved {
            if let Some(node) = tree.get_mut(*id) {
                node.parent = Some(parent);
            }
        }
        tree.node_mut(parent)?.children.extend(moved);
        Ok(())
    }

    /// Detach `child` from `parent` without releasing it.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let mut tree = self.tree.borrow_mut();
        tree.node(parent)?;
        if tree.node(child)?.parent != Some(parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        tree.detach(child);
        Ok(())
    }

    /// Release every current child of `parent`, then append `nodes` in order.
    pub fn replace_children(&self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        let old = {
            let tree = self.tree.borrow();
            if !tree.node(parent)?.content.accepts_children() {
                let child = nodes.first().copied().unwrap_or(parent);
                return Err(DomError::HierarchyRequest { parent, child });
            }
            tree.node(parent)?.children.clone()
        };
        for child in old {
            self.release(child);
        }
        for node in nodes {
            self.append_child(parent, *node)?;
        }
        Ok(())
    }

    /// Detach and free `node` with its subtree. Missing nodes are ignored.
    pub fn release(&self, node: NodeId) {
        let freed = self.tree.borrow_mut().free_subtree(node);
        // Listener closures may own state handles; drop them without the borrow.
        drop(freed);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) -> DomResult<()> {
        if !is_valid_name(name, true) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        let value: String = value.into();
        let mut tree = self.tree.borrow_mut();
        let element = tree.element_mut(node)?;
        if name.eq_ignore_ascii_case("style") {
            // Inline style has one home: the style map.
            element.style = parse_style(&value);
        } else {
            element.attributes.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Attribute value; `style` reads back the serialized inline style.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let element = tree.get(node)?.element()?;
        if name.eq_ignore_ascii_case("style") {
            return (!element.style.is_empty()).then(|| style_text(&element.style));
        }
        element.attributes.get(name).cloned()
    }

    /// All attributes in the order they were first set.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let tree = self.tree.borrow();
        tree.get(node)
            .and_then(|n| n.element())
            .map(|el| {
                el.attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> DomResult<()> {
        self.tree
            .borrow_mut()
            .element_mut(node)?
            .attributes
            .shift_remove(name);
        Ok(())
    }

    pub fn set_class_name(&self, node: NodeId, class_name: impl Into<String>) -> DomResult<()> {
        self.tree.borrow_mut().element_mut(node)?.class_name = Some(class_name.into());
        Ok(())
    }

    pub fn class_name(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?.element()?.class_name.clone()
    }

    /// Set one inline style property, e.g. `("background-color", "red")`.
    pub fn set_style_property(
        &self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<()> {
        self.tree
            .borrow_mut()
            .element_mut(node)?
            .style
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?.element()?.style.get(name).cloned()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: EventListener,
    ) -> DomResult<()> {
        self.tree
            .borrow_mut()
            .element_mut(node)?
            .listeners
            .push((event_type.to_string(), listener));
        Ok(())
    }

    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        let tree = self.tree.borrow();
        tree.get(node)
            .and_then(|n| n.element())
            .map(|el| el.listeners.iter().filter(|(t, _)| t == event_type).count())
            .unwrap_or(0)
    }

    /// Dispatch `event_type` at `target` and bubble to its ancestors.
    ///
    /// Listeners run without the tree borrowed, so they may mutate the
    /// document (including releasing the target). Returns the number of
    /// listeners invoked.
    pub fn dispatch_event(&self, target: NodeId, event_type: &str) -> DomResult<usize> {
        // The propagation path and its listeners are fixed before any runs,
        // so a listener that rebuilds the tree cannot hide its ancestors.
        let route: Vec<(NodeId, Vec<EventListener>)> = {
            let tree = self.tree.borrow();
            tree.node(target)?;
            let mut route = Vec::new();
            let mut current = Some(target);
            while let Some(id) = current {
                let Some(node) = tree.get(id) else { break };
                let listeners = node
                    .element()
                    .map(|el| {
                        el.listeners
                            .iter()
                            .filter(|(t, _)| t == event_type)
                            .map(|(_, l)| l.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                route.push((id, listeners));
                current = node.parent;
            }
            route
        };

        let event = Event::new(event_type, target);
        let mut invoked = 0;
        for (node, listeners) in route {
            event.set_current_target(node);
            for listener in listeners {
                listener(&event);
                invoked += 1;
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        Ok(invoked)
    }

    /// Dispatch a `click` event at `node`.
    pub fn click(&self, node: NodeId) -> DomResult<usize> {
        self.dispatch_event(node, "click")
    }

    // -------------------------------------------------------------------------
    // Render Container Claims
    // -------------------------------------------------------------------------

    /// Record a new owner of `container` and return its token.
    pub(crate) fn claim(&self, container: NodeId) -> u64 {
        let mut tree = self.tree.borrow_mut();
        tree.next_claim += 1;
        let token = tree.next_claim;
        tree.claims.insert(container, token);
        token
    }

    pub(crate) fn is_claimed_by(&self, container: NodeId, token: u64) -> bool {
        self.tree.borrow().claims.get(&container) == Some(&token)
    }

    pub(crate) fn with_tree<R>(&self, f: impl FnOnce(&TreeView<'_>) -> R) -> R {
        let tree = self.tree.borrow();
        f(&TreeView { tree: &tree })
    }
}

/// Read-only access for the serializer.
pub(crate) struct TreeView<'a> {
    tree: &'a Tree,
}

impl TreeView<'_> {
    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.tree.get(id)
    }
}

/// Parse `"color: red; margin: 0"` into style entries. Malformed
/// declarations are dropped.
fn parse_style(text: &str) -> IndexMap<String, String> {
    text.split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

pub(crate) fn style_text(style: &IndexMap<String, String>) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text(tree: &Tree, node: &NodeData, out: &mut String) {
    for child in &node.children {
        let Some(child) = tree.get(*child) else { continue };
        match &child.content {
            NodeContent::Text(text) => out.push_str(text),
            NodeContent::Comment(_) => {}
            _ => collect_text(tree, child, out),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
