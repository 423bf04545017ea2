//! # spark-dom
//!
//! A minimal component renderer over an in-memory document tree.
//!
//! Function components return element descriptors; a [`RenderRoot`] turns
//! them into live nodes inside a container element, keeps per-instance hook
//! state between renders, and re-renders the whole tree whenever a state
//! setter fires.
//!
//! ## Modules
//!
//! - [`dom`] - arena document: elements, text, attributes, styles, events
//! - [`element`] - descriptors, props, children, components, [`h!`]
//! - [`runtime`] - render roots, instance arena, render passes
//! - [`hooks`] - `use_state`, `use_effect`, `use_ref`, `use_memo`
//! - [`error`] - [`DomError`] and [`RenderError`]
//!
//! ## Diagnostics
//!
//! The crate logs through [`tracing`]: render passes at `debug`, individual
//! effects and components at `trace`, recoverable misuse (duplicate keys,
//! reordered hooks, handlers under non-event props) at `warn`. Install any
//! subscriber to see them.
//!
//! ## Example
//!
//! ```ignore
//! use spark_dom::*;
//!
//! fn counter(_: &Props, _: &[Child]) -> Child {
//!     let (count, set_count) = use_state(0);
//!     h!(
//!         "button",
//!         Props::new().on("onClick", move |_| set_count.update(|c| c + 1)),
//!         "Clicked ", count, " times"
//!     )
//!     .into()
//! }
//!
//! let doc = Document::new();
//! let container = doc.create_element("main")?;
//! let root = render(h!(Component::new("Counter", counter), ()), &doc, container)?;
//! doc.click(doc.children(container)[0])?;
//! assert_eq!(doc.text_content(container), "Clicked 1 times");
//! ```

pub mod dom;
pub mod element;
pub mod error;
pub mod hooks;
pub mod runtime;

pub use dom::{Document, Event, EventListener, NodeId, NodeKind};

pub use element::{
    Child, Component, Element, ElementKind, EventHandler, Fragment, PropValue, Props, RenderFn,
    Style, create_element,
};

pub use error::{DomError, DomResult, RenderError, Result};

pub use runtime::{
    Cleanup, PathSegment, RenderRoot, RootOptions, TreePath, create_root, create_root_with,
    render,
};

pub use hooks::{
    StateSetter, TearDown, use_effect, use_effect_with, use_memo, use_ref, use_state,
    use_state_lazy,
};
