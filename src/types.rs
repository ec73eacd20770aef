//! Core types for graft.
//!
//! These types define the foundation that everything builds on.
//! They flow between the authoring layer, the engine, and the host adapter.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Host Node Handle
// =============================================================================

/// Opaque handle to a real node in the host tree.
///
/// Handles are allocated by the [`HostAdapter`](crate::host::HostAdapter);
/// the engine only stores and passes them back. Using an index instead of an
/// object reference keeps the engine host-environment-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a handle from a raw index. Only host adapters should do this.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw index behind this handle.
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Payload delivered to an event handler.
///
/// Dispatch and bubbling semantics belong to the external event subsystem;
/// the engine only registers handlers keyed by lowercased event name.
#[derive(Debug, Clone)]
pub struct Event {
    /// Lowercased event name ("click", "input", ...).
    pub name: String,
}

impl Event {
    /// Create an event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Event handler callback (Rc for shared ownership in closures).
///
/// Using Rc<dyn Fn> instead of Box<dyn Fn> allows cloning callbacks
/// into the event registry without ownership issues.
pub type EventCallback = Rc<dyn Fn(&Event)>;

// =============================================================================
// Properties
// =============================================================================

/// Ordered property map of a virtual node.
pub type Props = IndexMap<String, PropValue>;

/// Ordered style sub-property map (value of the reserved "style" prop).
pub type StyleMap = IndexMap<String, String>;

/// A property value.
///
/// A closed set of value shapes: plain scalars, text, a style map that is
/// diffed sub-property by sub-property, and event handler callbacks that are
/// delegated to the event registry instead of being written to the host.
#[derive(Clone)]
pub enum PropValue {
    /// Absent/cleared value.
    Null,
    /// Boolean attribute.
    Bool(bool),
    /// Integer attribute.
    Int(i64),
    /// Floating-point attribute.
    Float(f64),
    /// Text attribute.
    Text(String),
    /// Style map, applied one sub-property at a time.
    Style(StyleMap),
    /// Event handler, registered through the event subsystem.
    Handler(EventCallback),
}

impl PropValue {
    /// Text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for [`PropValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            // Handlers compare by identity - two closures are "the same prop"
            // only if they are literally the same allocation.
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(v) => write!(f, "Bool({v})"),
            PropValue::Int(v) => write!(f, "Int({v})"),
            PropValue::Float(v) => write!(f, "Float({v})"),
            PropValue::Text(v) => write!(f, "Text({v:?})"),
            PropValue::Style(v) => write!(f, "Style({v:?})"),
            PropValue::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("null"),
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Float(v) => write!(f, "{v}"),
            PropValue::Text(v) => f.write_str(v),
            PropValue::Style(v) => {
                for (key, value) in v {
                    write!(f, "{key}:{value};")?;
                }
                Ok(())
            }
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<StyleMap> for PropValue {
    fn from(value: StyleMap) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventCallback> for PropValue {
    fn from(value: EventCallback) -> Self {
        PropValue::Handler(value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_value_equality() {
        assert_eq!(PropValue::Int(1), PropValue::Int(1));
        assert_ne!(PropValue::Int(1), PropValue::Int(2));
        assert_ne!(PropValue::Int(1), PropValue::Text("1".into()));
        assert_eq!(PropValue::from("a"), PropValue::Text("a".into()));
    }

    #[test]
    fn test_handler_equality_is_identity() {
        let a: EventCallback = Rc::new(|_| {});
        let b: EventCallback = Rc::new(|_| {});
        assert_eq!(
            PropValue::Handler(a.clone()),
            PropValue::Handler(a.clone())
        );
        assert_ne!(PropValue::Handler(a), PropValue::Handler(b));
    }

    #[test]
    fn test_style_display() {
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        style.insert("width".into(), "10px".into());
        assert_eq!(PropValue::Style(style).to_string(), "color:red;width:10px;");
    }
}
