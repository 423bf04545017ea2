//! Element descriptors - immutable descriptions of what to render.
//!
//! An [`Element`] names a tag, a [`Component`] or the [`Fragment`] marker,
//! carries [`Props`] and an ordered list of [`Child`] values. Descriptors never
//! hold live nodes; the runtime materializes them into a
//! [`Document`](crate::dom::Document).
//!
//! # Conditional children
//!
//! Booleans, `None` and `()` become [`Child::Empty`] and are dropped by
//! [`create_element`], so `bool::then` reads like `condition && child`:
//!
//! ```ignore
//! h!("div", (), open.then(|| h!("span", (), "x")))
//! ```

mod component;
mod props;

pub use component::{Component, RenderFn};
pub use props::{EventHandler, PropValue, Props, Style};

pub(crate) use props::{event_name, js_number};

// =============================================================================
// Element Kind
// =============================================================================

/// Marker kind that groups children without a wrapping node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment;

/// What an element materializes as.
#[derive(Clone, Debug)]
pub enum ElementKind {
    Tag(String),
    Component(Component),
    Fragment,
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        ElementKind::Tag(tag.to_string())
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        ElementKind::Tag(tag)
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        ElementKind::Component(component)
    }
}

impl From<Fragment> for ElementKind {
    fn from(_: Fragment) -> Self {
        ElementKind::Fragment
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable description of one node.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementKind,
    props: Props,
    children: Vec<Child>,
    key: Option<String>,
}

impl Element {
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Flattened children (never contains lists or empties).
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Identity key lifted from the `key` prop.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Return a copy with a different identity key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

// =============================================================================
// Child
// =============================================================================

/// A value that can appear as a child or be returned by a component.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Text(String),
    Number(f64),
    List(Vec<Child>),
    /// Materializes as a placeholder; dropped from element children.
    Empty,
}

impl Child {
    pub fn is_empty(&self) -> bool {
        matches!(self, Child::Empty)
    }

    /// The element's identity key, if this child is a keyed element.
    pub fn key(&self) -> Option<&str> {
        match self {
            Child::Element(el) => el.key(),
            _ => None,
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Child::Empty)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! number_child {
    ($($t:ty),*) => {
        $(impl From<$t> for Child {
            fn from(value: $t) -> Self {
                Child::Number(value as f64)
            }
        })*
    };
}

number_child!(i32, i64, u8, u16, u32, u64, usize, f32, f64);

// =============================================================================
// Construction
// =============================================================================

/// Build an element descriptor.
///
/// Children are flattened recursively and empties (booleans, `None`, `()`)
/// are dropped. A `key` prop is lifted out of the props into the element's
/// identity key. Nothing else is validated here; bad tag or attribute names
/// surface when the element is materialized.
pub fn create_element(
    kind: impl Into<ElementKind>,
    props: impl Into<Props>,
    children: impl IntoIterator<Item = Child>,
) -> Element {
    let mut props = props.into();
    let key = props.take_key();
    let mut flat = Vec::new();
    for child in children {
        flatten_into(child, &mut flat);
    }
    Element {
        kind: kind.into(),
        props,
        children: flat,
        key,
    }
}

fn flatten_into(child: Child, out: &mut Vec<Child>) {
    match child {
        Child::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Child::Empty => {}
        other => out.push(other),
    }
}

/// Variadic [`create_element`].
///
/// ```ignore
/// h!("ul", Props::new().class("legend"),
///     h!("li", (), "EU"),
///     groups.iter().map(|g| h!("li", Props::new().key(&g.id), &g.name)).collect::<Vec<_>>(),
/// )
/// ```
#[macro_export]
macro_rules! h {
    ($kind:expr) => {
        $crate::create_element($kind, $crate::Props::new(), ::std::vec::Vec::<$crate::Child>::new())
    };
    ($kind:expr, $props:expr $(, $child:expr)* $(,)?) => {{
        let children: ::std::vec::Vec<$crate::Child> = ::std::vec![$($crate::Child::from($child)),*];
        $crate::create_element($kind, $props, children)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(element: &Element) -> &str {
        match element.kind() {
            ElementKind::Tag(t) => t,
            _ => panic!("not a tag element"),
        }
    }

    #[test]
    fn test_flattens_nested_lists() {
        let el = create_element(
            "ul",
            (),
            vec![
                Child::from("a"),
                Child::from(vec![Child::from("b"), Child::from(vec!["c", "d"])]),
                Child::from(5),
            ],
        );
        assert_eq!(tag(&el), "ul");
        assert_eq!(el.children().len(), 5);
        assert!(matches!(&el.children()[3], Child::Text(t) if t == "d"));
        assert!(matches!(&el.children()[4], Child::Number(n) if *n == 5.0));
    }

    #[test]
    fn test_drops_empty_children() {
        let shown = false;
        let el = crate::h!(
            "div",
            (),
            shown.then(|| crate::h!("span", (), "x")),
            true,
            false,
            (),
            None::<Element>,
            "kept"
        );
        assert_eq!(el.children().len(), 1);
        assert!(matches!(&el.children()[0], Child::Text(t) if t == "kept"));

        let shown = true;
        let el = crate::h!("div", (), shown.then(|| crate::h!("span", (), "x")));
        assert_eq!(el.children().len(), 1);
        assert!(matches!(&el.children()[0], Child::Element(e) if tag(e) == "span"));
    }

    #[test]
    fn test_key_is_lifted_out_of_props() {
        let el = crate::h!("li", Props::new().key("fr").with("id", "row"));
        assert_eq!(el.key(), Some("fr"));
        assert!(!el.props().contains_key("key"));
        assert_eq!(el.props().get_str("id"), Some("row"));
        assert_eq!(Child::from(el.clone()).key(), Some("fr"));
        assert_eq!(el.with_key("de").key(), Some("de"));
    }

    #[test]
    fn test_fragment_and_null_props() {
        let el = create_element(Fragment, None::<Props>, vec![Child::from("a")]);
        assert!(matches!(el.kind(), ElementKind::Fragment));
        assert!(el.props().is_empty());
        let bare = crate::h!("hr");
        assert!(bare.children().is_empty());
    }
}
