//! Events and listeners.
//!
//! Dispatch is synchronous and bubbles from the target through its ancestors
//! until a listener calls [`Event::stop_propagation`].

use std::cell::Cell;
use std::rc::Rc;

use super::node::NodeId;

/// Listener callback (Rc so it can be cloned out of the tree before invoking).
pub type EventListener = Rc<dyn Fn(&Event)>;

/// An event travelling through the document.
#[derive(Debug)]
pub struct Event {
    event_type: String,
    target: NodeId,
    current_target: Cell<NodeId>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event aimed at `target`.
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: Cell::new(target),
            propagation_stopped: Cell::new(false),
        }
    }

    /// The lower-case event name, e.g. `"click"`.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listeners are currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    /// Stop bubbling after the current node's listeners finish.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }
}
