//! Element properties - ordered attribute/event/style bag.
//!
//! Props are pure data. Keys keep their insertion order so materialized
//! attributes come out in the order they were written.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Event, EventListener};

/// Event handler stored in props. Same shape as a document listener.
pub type EventHandler = EventListener;

/// Inline style entries, property name to value.
pub type Style = IndexMap<String, String>;

// =============================================================================
// Prop Value
// =============================================================================

/// One property value.
#[derive(Clone)]
pub enum PropValue {
    Str(String),
    Number(f64),
    Bool(bool),
    Style(Style),
    Handler(EventHandler),
    /// Never applied to a node.
    Null,
}

impl PropValue {
    /// The string form used when the value lands in a generic attribute.
    ///
    /// Handlers and null have none.
    pub fn to_attribute_string(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Number(n) => Some(js_number(*n)),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Style(style) => Some(
                style
                    .iter()
                    .map(|(k, v)| format!("{k}: {v};"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            PropValue::Handler(_) | PropValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            PropValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            PropValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            PropValue::Style(s) => f.debug_tuple("Style").field(s).finish(),
            PropValue::Handler(_) => f.write_str("Handler(..)"),
            PropValue::Null => f.write_str("Null"),
        }
    }
}

/// Handlers compare by identity.
impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            (PropValue::Null, PropValue::Null) => true,
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        PropValue::Str(value.clone())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropValue::Null)
    }
}

macro_rules! number_prop {
    ($($t:ty),*) => {
        $(impl From<$t> for PropValue {
            fn from(value: $t) -> Self {
                PropValue::Number(value as f64)
            }
        })*
    };
}

number_prop!(i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Format a number the way JavaScript's `String(n)` does.
pub(crate) fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // -0 prints as 0
    let value = if value == 0.0 { 0.0 } else { value };
    let mut buf = ryu_js::Buffer::new();
    buf.format_finite(value).to_string()
}

// =============================================================================
// Props
// =============================================================================

/// Ordered property map of an element.
#[derive(Clone, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set `key` to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder: register `handler` under an event prop such as `"onClick"`.
    pub fn on(self, key: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        let handler: EventHandler = Rc::new(handler);
        self.with(key, PropValue::Handler(handler))
    }

    /// Builder: set the `className` prop.
    pub fn class(self, class_name: impl Into<String>) -> Self {
        self.with("className", class_name.into())
    }

    /// Builder: set the `style` prop from `(property, value)` pairs.
    pub fn style<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let style: Style = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.with("style", PropValue::Style(style))
    }

    /// Builder: set the identity key used to match this element across renders.
    pub fn key(self, key: impl Into<String>) -> Self {
        self.with("key", key.into())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.entries.get(key)? {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key)? {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_handler(&self, key: &str) -> Option<EventHandler> {
        match self.entries.get(key)? {
            PropValue::Handler(h) => Some(h.clone()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove the `key` prop and return its string form.
    pub(crate) fn take_key(&mut self) -> Option<String> {
        self.entries
            .shift_remove("key")
            .and_then(|value| value.to_attribute_string())
    }
}

impl From<Option<Props>> for Props {
    fn from(value: Option<Props>) -> Self {
        value.unwrap_or_default()
    }
}

impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

/// Event props look like `onClick`: `on` followed by an uppercase letter.
pub(crate) fn event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    rest.chars()
        .next()
        .filter(char::is_ascii_uppercase)
        .map(|_| rest.to_ascii_lowercase())
}
