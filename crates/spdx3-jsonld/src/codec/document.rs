//! Rebuilding an `SpdxDocument` from deserialized elements.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::model::id::synthesized_document_id;
use crate::model::{NodeBuilder, PropertyDescriptor, TypeName, TypedNode, Value};
use crate::schema::{JsonLdSchema, SchemaCache};
use crate::store::ModelStore;
use crate::vocab::{self, classes, properties};

fn core_property(schema: &JsonLdSchema, name: &str) -> PropertyDescriptor {
    schema
        .property_descriptor(name)
        .unwrap_or_else(|| vocab::core(name))
}

/// Wraps deserialized `nodes` in a document.
///
/// If exactly one node is an `SpdxDocument` it is reused, otherwise a new
/// document `urn:spdx-document:<uuid>` is created. The document's `element`
/// list is replaced by every other element in `nodes`; `rootElement` gets the
/// same list if it was empty. Every distinct external element id reachable
/// from the elements is imported through an `ExternalMap`, in id order.
pub fn elements_to_document(
    store: &dyn ModelStore,
    cache: &SchemaCache,
    nodes: &[TypedNode],
) -> Result<TypedNode, GraphError> {
    let mut documents = nodes
        .iter()
        .filter(|node| node.type_name.is_core_class(classes::SPDX_DOCUMENT));
    let document = match (documents.next(), documents.next()) {
        (Some(document), None) => document.clone(),
        _ => {
            let document = TypedNode::new(
                synthesized_document_id(),
                TypeName::core(classes::SPDX_DOCUMENT),
                cache.latest_version(),
            );
            store.create(&document)?;
            debug!(id = %document.id, "created document for deserialized elements");
            document
        }
    };

    let schema = cache.get_or_create(&document.spec_version)?;
    let element = core_property(&schema, properties::ELEMENT);
    let root_element = core_property(&schema, properties::ROOT_ELEMENT);
    let import = core_property(&schema, properties::IMPORT);
    let external_spdx_id = core_property(&schema, properties::EXTERNAL_SPDX_ID);

    store.clear_collection(&document.id, &element)?;
    let add_roots = store.list_values(&document.id, &root_element)?.is_empty();

    let mut visited = FxHashSet::default();
    let mut externals = BTreeSet::new();
    for node in nodes {
        if node.id == document.id {
            continue;
        }
        let node_schema = cache.get_or_create(&node.spec_version)?;
        if !node_schema.is_element_type(&node.type_name) {
            warn!(
                id = %node.id,
                type_name = %node.type_name,
                "not an element, excluded from document"
            );
            continue;
        }
        store.add_value_to_collection(&document.id, &element, Value::Node(node.clone()))?;
        if add_roots {
            store.add_value_to_collection(&document.id, &root_element, Value::Node(node.clone()))?;
        }
        collect_externals(store, &node.id, &mut visited, &mut externals)?;
    }

    for id in externals {
        let map = NodeBuilder::anonymous(store, TypeName::core(classes::EXTERNAL_MAP), document.spec_version.as_str())
            .set(external_spdx_id.clone(), Value::String(id))
            .build(store)?;
        store.add_value_to_collection(&document.id, &import, Value::Node(map))?;
    }
    Ok(document)
}

/// Adds the ids of external elements reachable from `id` to `externals`.
fn collect_externals(
    store: &dyn ModelStore,
    id: &str,
    visited: &mut FxHashSet<String>,
    externals: &mut BTreeSet<String>,
) -> Result<(), GraphError> {
    if !visited.insert(id.to_string()) {
        return Ok(());
    }
    for property in store.property_descriptors(id)? {
        let values = if store.is_collection_property(id, &property)? {
            store.list_values(id, &property)?
        } else {
            store.get_value(id, &property)?.into_iter().collect()
        };
        for value in values {
            match value {
                Value::External(uri) => {
                    externals.insert(uri);
                }
                Value::Node(node) => collect_externals(store, &node.id, visited, externals)?,
                _ => {}
            }
        }
    }
    Ok(())
}
