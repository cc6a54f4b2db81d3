//! How a node-valued property value is written.

use rustc_hash::FxHashMap;

use crate::model::TypedNode;
use crate::schema::JsonLdSchema;
use crate::vocab::classes;

/// Type classification the reference policy depends on.
pub trait TypeClasses {
    fn is_element(&self, node: &TypedNode) -> bool;
    fn is_license_expression(&self, node: &TypedNode) -> bool;
}

impl TypeClasses for JsonLdSchema {
    fn is_element(&self, node: &TypedNode) -> bool {
        JsonLdSchema::is_element_type(self, &node.type_name)
    }

    fn is_license_expression(&self, node: &TypedNode) -> bool {
        JsonLdSchema::is_license_expression_type(self, &node.type_name)
    }
}

/// Serialized form of a node referenced from a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// The element's id, remapped if it was minted during serialization.
    ElementReference(String),
    /// The id assigned to a creation info emitted as its own graph entry.
    CreationInfoReference(String),
    /// A license expression string.
    LicenseExpression,
    /// A nested object.
    Inline,
}

/// Picks the serialized form of `node`.
///
/// `serialized_ids` maps store ids to the ids written for them. Rules apply
/// in order: elements are referenced, creation infos with an assigned id are
/// referenced, license expressions are written as strings when `pretty`,
/// everything else is inlined.
pub fn decide(
    types: &impl TypeClasses,
    node: &TypedNode,
    serialized_ids: &FxHashMap<String, String>,
    pretty: bool,
) -> ReferencePolicy {
    if types.is_element(node) {
        let id = serialized_ids.get(&node.id).unwrap_or(&node.id);
        return ReferencePolicy::ElementReference(id.clone());
    }
    if node.type_name.is_core_class(classes::CREATION_INFO) {
        if let Some(id) = serialized_ids.get(&node.id) {
            return ReferencePolicy::CreationInfoReference(id.clone());
        }
    }
    if pretty && types.is_license_expression(node) {
        return ReferencePolicy::LicenseExpression;
    }
    ReferencePolicy::Inline
}
