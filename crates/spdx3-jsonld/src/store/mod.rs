//! The object store the codec reads from and writes into.
//!
//! The codec only talks to [`ModelStore`]. [`InMemoryStore`] is a complete
//! implementation suitable for tests, tools and as the base of a
//! [`JsonLdStore`](crate::JsonLdStore).

mod copy;
mod memory;

pub use copy::copy_node;
pub use memory::InMemoryStore;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::model::{PropertyDescriptor, TypeName, TypedNode, Value};

/// Kind of id requested from [`ModelStore::next_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Opaque id for a node without a URI.
    Anonymous,
    /// Sequence id used when minting URIs for anonymous elements.
    Element,
}

/// Mode of a critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Read,
    Write,
}

/// Scoped store lock. The lock is released when the guard is dropped.
pub enum StoreLock<'a> {
    Read(RwLockReadGuard<'a, ()>),
    Write(RwLockWriteGuard<'a, ()>),
    /// For stores without a critical section.
    Unlocked,
}

impl StoreLock<'_> {
    pub fn mode(&self) -> Option<LockMode> {
        match self {
            StoreLock::Read(_) => Some(LockMode::Read),
            StoreLock::Write(_) => Some(LockMode::Write),
            StoreLock::Unlocked => None,
        }
    }
}

impl std::fmt::Debug for StoreLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StoreLock").field(&self.mode()).finish()
    }
}

/// Typed node store with single and multi-valued properties.
///
/// Methods take `&self`; implementations use interior mutability so a store
/// can be shared between a serializer, a deserializer and callers.
pub trait ModelStore: Send + Sync {
    /// Creates `node`. An existing node with the same id is reset: it takes
    /// the new type and spec version and loses all property values.
    fn create(&self, node: &TypedNode) -> Result<(), StoreError>;

    fn exists(&self, id: &str) -> bool;

    /// True if `id` was issued by [`next_id`](Self::next_id) for [`IdKind::Anonymous`].
    fn is_anon(&self, id: &str) -> bool;

    fn next_id(&self, kind: IdKind) -> String;

    fn typed_node(&self, id: &str) -> Option<TypedNode>;

    fn get_value(&self, id: &str, property: &PropertyDescriptor) -> Result<Option<Value>, StoreError>;

    /// Sets a single-valued property, replacing any previous value.
    fn set_value(&self, id: &str, property: &PropertyDescriptor, value: Value) -> Result<(), StoreError>;

    /// Appends to a multi-valued property, creating it if absent.
    fn add_value_to_collection(
        &self,
        id: &str,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Removes all values of a multi-valued property.
    fn clear_collection(&self, id: &str, property: &PropertyDescriptor) -> Result<(), StoreError>;

    /// Values of a multi-valued property in insertion order.
    fn list_values(&self, id: &str, property: &PropertyDescriptor) -> Result<Vec<Value>, StoreError>;

    fn is_collection_property(&self, id: &str, property: &PropertyDescriptor) -> Result<bool, StoreError>;

    /// Properties of `id` that currently hold a value.
    fn property_descriptors(&self, id: &str) -> Result<Vec<PropertyDescriptor>, StoreError>;

    /// All nodes, or the nodes of one type, ordered by id.
    fn nodes_of_type(&self, type_name: Option<&TypeName>) -> Vec<TypedNode>;

    fn enter_critical_section(&self, mode: LockMode) -> StoreLock<'_>;
}
