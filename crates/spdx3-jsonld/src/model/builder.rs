//! Builder API for populating store nodes.
//!
//! # Example
//!
//! ```rust
//! use spdx3_jsonld::model::{NodeBuilder, TypeName};
//! use spdx3_jsonld::store::InMemoryStore;
//! use spdx3_jsonld::vocab;
//!
//! let store = InMemoryStore::new();
//! let person = NodeBuilder::new("https://example.com/alice", TypeName::core("Person"), "3.0.1")
//!     .set(vocab::core("name"), "Alice")
//!     .build(&store)
//!     .unwrap();
//! assert_eq!(person.type_name.to_string(), "Core.Person");
//! ```

use crate::error::StoreError;
use crate::model::node::{PropertyDescriptor, TypedNode};
use crate::model::type_name::TypeName;
use crate::model::value::Value;
use crate::store::ModelStore;

#[derive(Debug, Clone)]
enum Assignment {
    Set(PropertyDescriptor, Value),
    Add(PropertyDescriptor, Value),
}

/// Builder for creating a node and its property values.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: TypedNode,
    assignments: Vec<Assignment>,
}

impl NodeBuilder {
    /// Creates a builder for a node with the given id, type and spec version.
    pub fn new(id: impl Into<String>, type_name: TypeName, spec_version: impl Into<String>) -> Self {
        Self {
            node: TypedNode::new(id, type_name, spec_version),
            assignments: Vec::new(),
        }
    }

    /// Creates a builder for a node with a fresh anonymous id from `store`.
    pub fn anonymous(store: &dyn ModelStore, type_name: TypeName, spec_version: impl Into<String>) -> Self {
        let id = store.next_id(crate::store::IdKind::Anonymous);
        Self::new(id, type_name, spec_version)
    }

    /// Returns the node this builder creates.
    pub fn node(&self) -> &TypedNode {
        &self.node
    }

    /// Sets a single-valued property.
    pub fn set(mut self, property: PropertyDescriptor, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment::Set(property, value.into()));
        self
    }

    /// Sets a single-valued property to an enumeration value or individual.
    pub fn set_uri(self, property: PropertyDescriptor, uri: impl Into<String>) -> Self {
        self.set(property, Value::Uri(uri.into()))
    }

    /// Appends a value to a multi-valued property.
    pub fn add(mut self, property: PropertyDescriptor, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment::Add(property, value.into()));
        self
    }

    /// Appends several values to a multi-valued property.
    pub fn add_all<I, V>(mut self, property: PropertyDescriptor, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.assignments
                .push(Assignment::Add(property.clone(), value.into()));
        }
        self
    }

    /// Creates the node in `store` and applies all assignments in order.
    pub fn build(self, store: &dyn ModelStore) -> Result<TypedNode, StoreError> {
        store.create(&self.node)?;
        for assignment in self.assignments {
            match assignment {
                Assignment::Set(property, value) => store.set_value(&self.node.id, &property, value)?,
                Assignment::Add(property, value) => {
                    store.add_value_to_collection(&self.node.id, &property, value)?
                }
            }
        }
        Ok(self.node)
    }
}
