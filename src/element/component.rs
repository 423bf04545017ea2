//! Function components.
//!
//! A component is a plain function from `(props, children)` to a child
//! value. State lives in the runtime's instance arena, reached through hooks.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use super::{Child, Props};

/// Signature of a component's render function.
pub type RenderFn = dyn Fn(&Props, &[Child]) -> Child;

/// A named function component.
///
/// Two components are the same kind when they wrap the same function type, so
/// wrapping a function again on every render keeps its instance state:
///
/// ```ignore
/// fn counter(_: &Props, _: &[Child]) -> Child { ... }
///
/// h!(Component::new("Counter", counter), ())
/// ```
#[derive(Clone)]
pub struct Component {
    type_id: TypeId,
    name: &'static str,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props, &[Child]) -> Child + 'static,
    {
        Self {
            type_id: TypeId::of::<F>(),
            name,
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `other` wraps the same function.
    pub fn same_kind(&self, other: &Component) -> bool {
        self.type_id == other.type_id
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn call(&self, props: &Props, children: &[Child]) -> Child {
        (self.render)(props, children)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}
