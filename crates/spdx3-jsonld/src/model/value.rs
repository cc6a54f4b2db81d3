//! Property values held by the store.

use crate::model::node::TypedNode;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    /// Reference to another node in the same store.
    Node(TypedNode),
    /// Enumeration value or named individual, by URI.
    Uri(String),
    /// Reference to an element outside the serialized set.
    External(String),
}

impl Value {
    /// Returns the referenced node, if this is a node reference.
    pub fn as_node(&self) -> Option<&TypedNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the URI of an enumeration, individual or external reference.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Value::Uri(uri) | Value::External(uri) => Some(uri),
            _ => None,
        }
    }

    /// Returns the external element id, if this is an external reference.
    pub fn as_external(&self) -> Option<&str> {
        match self {
            Value::External(uri) => Some(uri),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<TypedNode> for Value {
    fn from(v: TypedNode) -> Self {
        Value::Node(v)
    }
}

impl From<&TypedNode> for Value {
    fn from(v: &TypedNode) -> Self {
        Value::Node(v.clone())
    }
}
