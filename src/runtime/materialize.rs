//! Materialization - descriptor tree to live nodes.
//!
//! # Rules
//!
//! - Empty: placeholder comment (keeps sibling positions stable)
//! - Text / number: text node
//! - List / fragment: children spliced into the parent at `path.i`
//! - Component: invoked inside its instance frame, output at `path.0`
//! - Tag: element, props applied, children at `path.i` (or `path.[key]`)
//!
//! Nodes are appended to their parent before their own children are built,
//! so everything created during a pass hangs off the pass's root fragment and
//! can be released in one call if the pass fails.

use std::collections::HashSet;

use crate::dom::{Document, NodeId};
use crate::element::{Child, Component, Element, ElementKind, PropValue, Props, event_name, js_number};
use crate::error::{DomResult, Result};

use super::Scheduler;
use super::context;
use super::instance::{Instance, InstanceRef, InstanceTable, PathSegment, TreePath};

pub(crate) struct Materializer<'a> {
    document: &'a Document,
    scheduler: Scheduler,
    placeholder: &'a str,
    /// Instances from the last committed render not yet visited.
    previous: InstanceTable,
    /// Instances visited in this pass, in visitation order.
    current: InstanceTable,
    /// Instances whose path now holds a different component.
    discarded: Vec<InstanceRef>,
}

/// What a finished pass leaves behind.
pub(crate) struct PassOutcome {
    pub current: InstanceTable,
    /// Not visited this pass.
    pub unvisited: InstanceTable,
    pub discarded: Vec<InstanceRef>,
}

impl<'a> Materializer<'a> {
    pub fn new(
        document: &'a Document,
        scheduler: Scheduler,
        placeholder: &'a str,
        previous: InstanceTable,
    ) -> Self {
        Self {
            document,
            scheduler,
            placeholder,
            previous,
            current: InstanceTable::default(),
            discarded: Vec::new(),
        }
    }

    pub fn finish(self) -> PassOutcome {
        PassOutcome {
            current: self.current,
            unvisited: self.previous,
            discarded: self.discarded,
        }
    }

    /// Materialize `child` at `path` and append the result to `parent`.
    pub fn materialize(&mut self, child: &Child, path: &TreePath, parent: NodeId) -> Result<()> {
        match child {
            Child::Empty => {
                let node = self.document.create_comment(self.placeholder);
                self.document.append_child(parent, node)?;
            }
            Child::Text(text) => {
                let node = self.document.create_text_node(text.as_str());
                self.document.append_child(parent, node)?;
            }
            Child::Number(value) => {
                let node = self.document.create_text_node(js_number(*value));
                self.document.append_child(parent, node)?;
            }
            Child::List(items) => self.materialize_children(items, path, parent)?,
            Child::Element(element) => self.materialize_element(element, path, parent)?,
        }
        Ok(())
    }

    fn materialize_children(
        &mut self,
        children: &[Child],
        path: &TreePath,
        parent: NodeId,
    ) -> Result<()> {
        let mut seen_keys: HashSet<&str> = HashSet::new();
        for (index, child) in children.iter().enumerate() {
            let segment = match child.key() {
                Some(key) if seen_keys.insert(key) => PathSegment::Key(key.to_string()),
                Some(key) => {
                    tracing::warn!(%path, key, index, "duplicate sibling key, using position");
                    PathSegment::Index(index)
                }
                None => PathSegment::Index(index),
            };
            self.materialize(child, &path.child(segment), parent)?;
        }
        Ok(())
    }

    fn materialize_element(
        &mut self,
        element: &Element,
        path: &TreePath,
        parent: NodeId,
    ) -> Result<()> {
        match element.kind() {
            ElementKind::Fragment => self.materialize_children(element.children(), path, parent),
            ElementKind::Component(component) => {
                self.materialize_component(component, element, path, parent)
            }
            ElementKind::Tag(tag) => {
                let node = self.document.create_element(tag)?;
                self.document.append_child(parent, node)?;
                apply_props(self.document, node, element.props())?;
                self.materialize_children(element.children(), path, node)
            }
        }
    }

    fn materialize_component(
        &mut self,
        component: &Component,
        element: &Element,
        path: &TreePath,
        parent: NodeId,
    ) -> Result<()> {
        let instance = self.instance_for(component, path);
        let output = {
            let _frame = context::enter(instance, self.scheduler.clone());
            tracing::trace!(component = component.name(), %path, depth = context::depth(), "rendering");
            component.call(element.props(), element.children())
        };
        self.materialize(&output, &path.index(0), parent)
    }

    /// Reuse the instance at `path` when it belongs to the same component.
    fn instance_for(&mut self, component: &Component, path: &TreePath) -> InstanceRef {
        let instance = match self.previous.shift_remove(path) {
            Some(existing) if existing.borrow().is_instance_of(component) => existing,
            Some(stale) => {
                tracing::debug!(
                    %path,
                    was = stale.borrow().name(),
                    now = component.name(),
                    "component changed, resetting instance"
                );
                self.discarded.push(stale);
                Instance::new(component, path.clone())
            }
            None => Instance::new(component, path.clone()),
        };
        self.current.insert(path.clone(), instance.clone());
        instance
    }
}

/// Apply element props to a freshly created node.
///
/// - `onXxx` handlers become `xxx` listeners
/// - `style` maps merge into the inline style; a `style` string replaces it
/// - `className` / `class` set the class
/// - anything else becomes an attribute
///
/// `children`, `key` and null values are skipped.
pub(crate) fn apply_props(document: &Document, node: NodeId, props: &Props) -> DomResult<()> {
    for (key, value) in props.iter() {
        if key == "children" || key == "key" || value.is_null() {
            continue;
        }
        match value {
            PropValue::Handler(handler) => match event_name(key) {
                Some(event) => document.add_event_listener(node, &event, handler.clone())?,
                None => tracing::warn!(prop = key, "handler under a non-event prop skipped"),
            },
            PropValue::Style(style) if key == "style" => {
                for (name, style_value) in style {
                    document.set_style_property(node, name, style_value.as_str())?;
                }
            }
            _ if key == "className" || key == "class" => {
                let class = value.to_attribute_string().unwrap_or_default();
                document.set_class_name(node, class)?;
            }
            _ => {
                if let Some(text) = value.to_attribute_string() {
                    document.set_attribute(node, key, text)?;
                }
            }
        }
    }
    Ok(())
}
