//! Core data types: node ids, type names, typed nodes and property values.

pub mod builder;
pub mod id;
pub mod node;
pub mod type_name;
pub mod value;

pub use builder::NodeBuilder;
pub use node::{PropertyDescriptor, TypedNode};
pub use type_name::TypeName;
pub use value::Value;
