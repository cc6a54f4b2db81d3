//! In-memory [`ModelStore`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::StoreError;
use crate::model::{PropertyDescriptor, TypeName, TypedNode, Value};
use crate::store::{IdKind, LockMode, ModelStore, StoreLock};

/// Prefix of anonymous ids issued by [`InMemoryStore`].
pub const ANON_PREFIX: &str = "__anon__";

/// Prefix of element sequence ids issued by [`InMemoryStore`].
pub const ELEMENT_ID_PREFIX: &str = "SPDXRef-gnrtd";

#[derive(Debug, Clone)]
enum Slot {
    Single(Value),
    Collection(Vec<Value>),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    node: TypedNode,
    properties: BTreeMap<PropertyDescriptor, Slot>,
}

/// A [`ModelStore`] backed by a hash map.
///
/// The critical section lock is separate from the lock guarding node data,
/// so a caller holding a read or write critical section can still call the
/// store's methods.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    critical: RwLock<()>,
    nodes: RwLock<FxHashMap<String, NodeRecord>>,
    next_anon: AtomicU64,
    next_element: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the store.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    fn with_record<T>(
        &self,
        id: &str,
        f: impl FnOnce(&NodeRecord) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let nodes = self.nodes.read();
        let record = nodes
            .get(id)
            .ok_or_else(|| StoreError::NodeNotFound { id: id.to_string() })?;
        f(record)
    }

    fn with_record_mut<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut NodeRecord) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut nodes = self.nodes.write();
        let record = nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound { id: id.to_string() })?;
        f(record)
    }
}

fn not_a_collection(id: &str, property: &PropertyDescriptor) -> StoreError {
    StoreError::NotACollection {
        id: id.to_string(),
        property: property.to_string(),
    }
}

fn is_a_collection(id: &str, property: &PropertyDescriptor) -> StoreError {
    StoreError::IsACollection {
        id: id.to_string(),
        property: property.to_string(),
    }
}

impl ModelStore for InMemoryStore {
    fn create(&self, node: &TypedNode) -> Result<(), StoreError> {
        self.nodes.write().insert(
            node.id.clone(),
            NodeRecord {
                node: node.clone(),
                properties: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.nodes.read().contains_key(id)
    }

    fn is_anon(&self, id: &str) -> bool {
        id.starts_with(ANON_PREFIX)
    }

    fn next_id(&self, kind: IdKind) -> String {
        match kind {
            IdKind::Anonymous => {
                let n = self.next_anon.fetch_add(1, Ordering::Relaxed);
                format!("{ANON_PREFIX}{n}")
            }
            IdKind::Element => {
                let n = self.next_element.fetch_add(1, Ordering::Relaxed);
                format!("{ELEMENT_ID_PREFIX}{n}")
            }
        }
    }

    fn typed_node(&self, id: &str) -> Option<TypedNode> {
        self.nodes.read().get(id).map(|r| r.node.clone())
    }

    fn get_value(&self, id: &str, property: &PropertyDescriptor) -> Result<Option<Value>, StoreError> {
        self.with_record(id, |record| match record.properties.get(property) {
            None => Ok(None),
            Some(Slot::Single(value)) => Ok(Some(value.clone())),
            Some(Slot::Collection(_)) => Err(is_a_collection(id, property)),
        })
    }

    fn set_value(&self, id: &str, property: &PropertyDescriptor, value: Value) -> Result<(), StoreError> {
        self.with_record_mut(id, |record| {
            record.properties.insert(property.clone(), Slot::Single(value));
            Ok(())
        })
    }

    fn add_value_to_collection(
        &self,
        id: &str,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<(), StoreError> {
        self.with_record_mut(id, |record| {
            match record
                .properties
                .entry(property.clone())
                .or_insert_with(|| Slot::Collection(Vec::new()))
            {
                Slot::Collection(values) => {
                    values.push(value);
                    Ok(())
                }
                Slot::Single(_) => Err(not_a_collection(id, property)),
            }
        })
    }

    fn clear_collection(&self, id: &str, property: &PropertyDescriptor) -> Result<(), StoreError> {
        self.with_record_mut(id, |record| match record.properties.get(property) {
            Some(Slot::Single(_)) => Err(not_a_collection(id, property)),
            Some(Slot::Collection(_)) => {
                record.properties.remove(property);
                Ok(())
            }
            None => Ok(()),
        })
    }

    fn list_values(&self, id: &str, property: &PropertyDescriptor) -> Result<Vec<Value>, StoreError> {
        self.with_record(id, |record| match record.properties.get(property) {
            None => Ok(Vec::new()),
            Some(Slot::Collection(values)) => Ok(values.clone()),
            Some(Slot::Single(_)) => Err(not_a_collection(id, property)),
        })
    }

    fn is_collection_property(&self, id: &str, property: &PropertyDescriptor) -> Result<bool, StoreError> {
        self.with_record(id, |record| {
            Ok(matches!(record.properties.get(property), Some(Slot::Collection(_))))
        })
    }

    fn property_descriptors(&self, id: &str) -> Result<Vec<PropertyDescriptor>, StoreError> {
        self.with_record(id, |record| Ok(record.properties.keys().cloned().collect()))
    }

    fn nodes_of_type(&self, type_name: Option<&TypeName>) -> Vec<TypedNode> {
        let nodes = self.nodes.read();
        let mut matching: Vec<TypedNode> = nodes
            .values()
            .filter(|r| type_name.is_none_or(|t| r.node.type_name == *t))
            .map(|r| r.node.clone())
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        matching
    }

    fn enter_critical_section(&self, mode: LockMode) -> StoreLock<'_> {
        match mode {
            LockMode::Read => StoreLock::Read(self.critical.read()),
            LockMode::Write => StoreLock::Write(self.critical.write()),
        }
    }
}
