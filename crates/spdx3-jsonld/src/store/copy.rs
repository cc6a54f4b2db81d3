//! Copying nodes between stores.

use rustc_hash::FxHashMap;

use crate::error::StoreError;
use crate::model::{TypedNode, Value};
use crate::store::{IdKind, ModelStore};

/// Copies node `id` and every node it references from `src` into `dst`.
///
/// URI ids are kept. Anonymous nodes receive fresh anonymous ids from `dst`.
/// Returns the node as created in `dst`.
pub fn copy_node(dst: &dyn ModelStore, src: &dyn ModelStore, id: &str) -> Result<TypedNode, StoreError> {
    let mut copied = FxHashMap::default();
    copy_recursive(dst, src, id, &mut copied)
}

fn copy_recursive(
    dst: &dyn ModelStore,
    src: &dyn ModelStore,
    id: &str,
    copied: &mut FxHashMap<String, TypedNode>,
) -> Result<TypedNode, StoreError> {
    if let Some(node) = copied.get(id) {
        return Ok(node.clone());
    }
    let source = src
        .typed_node(id)
        .ok_or_else(|| StoreError::NodeNotFound { id: id.to_string() })?;
    let target_id = if src.is_anon(id) {
        dst.next_id(IdKind::Anonymous)
    } else {
        id.to_string()
    };
    let target = TypedNode::new(target_id, source.type_name, source.spec_version);
    dst.create(&target)?;
    copied.insert(id.to_string(), target.clone());

    for property in src.property_descriptors(id)? {
        if src.is_collection_property(id, &property)? {
            for value in src.list_values(id, &property)? {
                let value = copy_value(dst, src, value, copied)?;
                dst.add_value_to_collection(&target.id, &property, value)?;
            }
        } else if let Some(value) = src.get_value(id, &property)? {
            let value = copy_value(dst, src, value, copied)?;
            dst.set_value(&target.id, &property, value)?;
        }
    }
    Ok(target)
}

fn copy_value(
    dst: &dyn ModelStore,
    src: &dyn ModelStore,
    value: Value,
    copied: &mut FxHashMap<String, TypedNode>,
) -> Result<Value, StoreError> {
    match value {
        Value::Node(node) => Ok(Value::Node(copy_recursive(dst, src, &node.id, copied)?)),
        other => Ok(other),
    }
}
