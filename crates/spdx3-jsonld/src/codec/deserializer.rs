//! JSON-LD graph to store deserialization.
//!
//! The graph is not topologically ordered, so a graph is read in three passes:
//!
//! 1. Record the `specVersion` of every `CreationInfo` entry.
//! 2. Create a node for every entry, so every id in the graph resolves.
//! 3. Fill properties, creating nodes for nested objects on demand.
//!
//! Blank ids (`_:x`) are mapped to store-issued anonymous ids. The mapping is
//! kept for the life of the deserializer, so a blank id names the same store
//! node in every call.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Number, Value as Json};
use tracing::{debug, warn};

use crate::codec::canonical::kind_name;
use crate::error::GraphError;
use crate::license::{listed_license_or_exception_id, LicenseRepository};
use crate::model::id::{is_absolute, is_blank};
use crate::model::{TypeName, TypedNode, Value};
use crate::schema::{JsonLdSchema, PropertyType, SchemaCache};
use crate::store::{copy_node, IdKind, ModelStore};
use crate::vocab::{self, classes, properties, AT_ID_FIELD, SPDX_ID_FIELD, TYPE_FIELD};

/// Fields that describe the node rather than a property.
const NODE_FIELDS: &[&str] = &[AT_ID_FIELD, SPDX_ID_FIELD, TYPE_FIELD];

/// The id of a JSON node: `spdxId`, else `@id`.
pub(crate) fn node_id(entry: &Json) -> Option<&str> {
    entry
        .get(SPDX_ID_FIELD)
        .or_else(|| entry.get(AT_ID_FIELD))
        .and_then(Json::as_str)
}

/// Per-call state.
struct Scope<'a> {
    /// CreationInfo id -> spec version, from pass 1.
    creation_versions: &'a FxHashMap<String, String>,
    /// JSON id -> node created for it.
    arena: FxHashMap<String, TypedNode>,
}

/// Reads JSON-LD graphs into a [`ModelStore`].
///
/// The deserializer does not lock the store; callers that share the store
/// hold [`LockMode::Write`](crate::store::LockMode::Write) around each call.
pub struct GraphDeserializer {
    store: Arc<dyn ModelStore>,
    cache: Arc<SchemaCache>,
    licenses: Option<Arc<dyn LicenseRepository>>,
    blank_ids: Mutex<FxHashMap<String, String>>,
}

impl GraphDeserializer {
    pub fn new(store: Arc<dyn ModelStore>, cache: Arc<SchemaCache>) -> Self {
        Self {
            store,
            cache,
            licenses: None,
            blank_ids: Mutex::new(FxHashMap::default()),
        }
    }

    /// Resolves listed license references from `licenses`. Without a
    /// repository they are kept as external references.
    pub fn with_license_repository(mut self, licenses: Arc<dyn LicenseRepository>) -> Self {
        self.licenses = Some(licenses);
        self
    }

    pub fn store(&self) -> &dyn ModelStore {
        self.store.as_ref()
    }

    /// Store id previously assigned to a blank id.
    pub fn blank_id(&self, blank: &str) -> Option<String> {
        self.blank_ids.lock().get(blank).cloned()
    }

    /// Deserializes a `@graph` array.
    ///
    /// Nodes without their own or a creation info spec version use
    /// `default_spec_version`. Returns the nodes created for top level entries
    /// with non-blank ids, in input order.
    pub fn deserialize_graph(&self, graph: &Json, default_spec_version: &str) -> Result<Vec<TypedNode>, GraphError> {
        let entries = graph.as_array().ok_or(GraphError::NotAnArray)?;

        // Pass 1: creation info spec versions.
        let mut creation_versions = FxHashMap::default();
        for entry in entries {
            if entry.get(TYPE_FIELD).and_then(Json::as_str) != Some(classes::CREATION_INFO) {
                continue;
            }
            let version = entry.get(properties::SPEC_VERSION).and_then(Json::as_str);
            match (node_id(entry), version) {
                (Some(id), Some(version)) => {
                    creation_versions.insert(id.to_string(), version.to_string());
                }
                (id, _) => warn!(
                    id = id.unwrap_or("[no id]"),
                    "unable to obtain spec version for creation info"
                ),
            }
        }

        // Pass 2: identities.
        let mut scope = Scope {
            creation_versions: &creation_versions,
            arena: FxHashMap::default(),
        };
        let mut created = Vec::new();
        for entry in entries {
            if !entry.is_object() {
                return Err(GraphError::InvalidEntry {
                    found: kind_name(entry),
                });
            }
            let id = node_id(entry).ok_or_else(|| GraphError::MissingId {
                type_name: entry
                    .get(TYPE_FIELD)
                    .and_then(Json::as_str)
                    .unwrap_or("[no type]")
                    .to_string(),
            })?;
            if scope.arena.contains_key(id) {
                debug!(id, "duplicate graph entry");
                continue;
            }
            let spec_version = self.spec_version_of(entry, scope.creation_versions, default_spec_version);
            let type_name = self.resolve_type(entry, &spec_version, id)?;
            let node = TypedNode::new(self.store_id(id), type_name, spec_version);
            self.store.create(&node)?;
            if !is_blank(id) && !self.store.is_anon(&node.id) {
                created.push(node.clone());
            }
            scope.arena.insert(id.to_string(), node);
        }

        // Pass 3: properties. The first entry for an id wins.
        let mut filled = FxHashSet::default();
        for entry in entries {
            if let Some(id) = node_id(entry).filter(|id| !filled.insert(*id)) {
                debug!(id, "skipping properties of duplicate graph entry");
                continue;
            }
            self.fill_node(entry, default_spec_version, &mut scope)?;
        }
        Ok(created)
    }

    /// Deserializes a single element object.
    pub fn deserialize_element(&self, element: &Json, default_spec_version: &str) -> Result<TypedNode, GraphError> {
        if !element.is_object() {
            return Err(GraphError::InvalidRoot {
                found: kind_name(element),
            });
        }
        let id = node_id(element).ok_or_else(|| GraphError::MissingId {
            type_name: element
                .get(TYPE_FIELD)
                .and_then(Json::as_str)
                .unwrap_or("[no type]")
                .to_string(),
        })?;
        if is_blank(id) {
            return Err(GraphError::BlankRoot { id: id.to_string() });
        }

        let no_creation_infos = FxHashMap::default();
        let mut scope = Scope {
            creation_versions: &no_creation_infos,
            arena: FxHashMap::default(),
        };
        let spec_version = self.spec_version_of(element, scope.creation_versions, default_spec_version);
        let type_name = self.resolve_type(element, &spec_version, id)?;
        let node = TypedNode::new(id, type_name, spec_version);
        self.store.create(&node)?;
        scope.arena.insert(id.to_string(), node);
        self.fill_node(element, default_spec_version, &mut scope)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Final store id for a JSON id.
    fn store_id(&self, json_id: &str) -> String {
        if !is_blank(json_id) {
            return json_id.to_string();
        }
        self.blank_ids
            .lock()
            .entry(json_id.to_string())
            .or_insert_with(|| self.store.next_id(IdKind::Anonymous))
            .clone()
    }

    /// Own `specVersion`, else that of the node's creation info, else `default`.
    fn spec_version_of(
        &self,
        entry: &Json,
        creation_versions: &FxHashMap<String, String>,
        default: &str,
    ) -> String {
        if let Some(version) = entry.get(properties::SPEC_VERSION).and_then(Json::as_str) {
            return version.to_string();
        }
        match entry.get(properties::CREATION_INFO) {
            Some(Json::Object(info)) => match info.get(properties::SPEC_VERSION).and_then(Json::as_str) {
                Some(version) => version.to_string(),
                None => {
                    warn!(id = node_id(entry).unwrap_or("[anonymous]"), "creation info has no spec version");
                    default.to_string()
                }
            },
            Some(Json::String(info_id)) => match creation_versions.get(info_id) {
                Some(version) => version.clone(),
                None => {
                    warn!(creation_info = %info_id, "no spec version found for creation info");
                    default.to_string()
                }
            },
            _ => default.to_string(),
        }
    }

    fn resolve_type(&self, entry: &Json, spec_version: &str, id: &str) -> Result<TypeName, GraphError> {
        let wire = entry
            .get(TYPE_FIELD)
            .and_then(Json::as_str)
            .ok_or_else(|| GraphError::MissingType { id: id.to_string() })?;
        let schema = self.cache.get_or_create(spec_version)?;
        schema.type_for_wire(wire).ok_or_else(|| GraphError::UnknownType {
            type_name: wire.to_string(),
        })
    }

    /// Fills the properties of the node for `entry`, creating the node first
    /// if it is a nested object not seen in pass 2.
    fn fill_node(&self, entry: &Json, default_spec_version: &str, scope: &mut Scope<'_>) -> Result<TypedNode, GraphError> {
        let fields = entry.as_object().ok_or_else(|| GraphError::InvalidEntry {
            found: kind_name(entry),
        })?;
        let json_id = node_id(entry);
        let node = match json_id.and_then(|id| scope.arena.get(id)) {
            Some(node) => node.clone(),
            None => {
                let store_id = match json_id {
                    Some(id) => self.store_id(id),
                    None => self.store.next_id(IdKind::Anonymous),
                };
                let spec_version = self.spec_version_of(entry, scope.creation_versions, default_spec_version);
                let type_name = self.resolve_type(entry, &spec_version, json_id.unwrap_or("[anonymous]"))?;
                let node = TypedNode::new(store_id, type_name, spec_version);
                self.store.create(&node)?;
                if let Some(id) = json_id {
                    scope.arena.insert(id.to_string(), node.clone());
                }
                node
            }
        };

        let schema = self.cache.get_or_create(&node.spec_version)?;
        for (field, value) in fields {
            if NODE_FIELDS.contains(&field.as_str()) {
                continue;
            }
            let property = schema
                .property_descriptor(field)
                .ok_or_else(|| GraphError::UnknownProperty {
                    property: field.clone(),
                    spec_version: node.spec_version.clone(),
                })?;
            match value {
                Json::Array(items) => {
                    for item in items {
                        let value = self.to_value(field, item, &node.spec_version, &schema, scope)?;
                        self.store.add_value_to_collection(&node.id, &property, value)?;
                    }
                }
                single => {
                    let value = self.to_value(field, single, &node.spec_version, &schema, scope)?;
                    self.store.set_value(&node.id, &property, value)?;
                }
            }
        }
        Ok(node)
    }

    // =========================================================================
    // Values
    // =========================================================================

    fn to_value(
        &self,
        field: &str,
        value: &Json,
        spec_version: &str,
        schema: &JsonLdSchema,
        scope: &mut Scope<'_>,
    ) -> Result<Value, GraphError> {
        match value {
            Json::Object(_) => Ok(Value::Node(self.fill_node(value, spec_version, scope)?)),
            Json::Array(_) => Err(GraphError::NestedArray {
                property: field.to_string(),
            }),
            Json::Null => Err(GraphError::NullValue {
                property: field.to_string(),
            }),
            Json::Bool(b) => match schema.property_type(field) {
                None | Some(PropertyType::Boolean) => Ok(Value::Bool(*b)),
                Some(PropertyType::String) => Ok(Value::String(b.to_string())),
                Some(expected) => Err(GraphError::TypeMismatch {
                    property: field.to_string(),
                    expected,
                    found: "boolean",
                }),
            },
            Json::Number(n) => number_value(field, n, schema.property_type(field)),
            Json::String(s) => self.string_value(field, s, schema, scope),
        }
    }

    fn string_value(
        &self,
        field: &str,
        s: &str,
        schema: &JsonLdSchema,
        scope: &Scope<'_>,
    ) -> Result<Value, GraphError> {
        let declared = schema.property_type(field);
        if matches!(declared, None | Some(PropertyType::Reference)) {
            if let Some(node) = scope.arena.get(s) {
                return Ok(Value::Node(node.clone()));
            }
        }
        if schema.is_node_valued(field) {
            return self.reference_value(s);
        }
        if schema.is_enum(field) {
            if is_absolute(s) {
                return Ok(Value::Uri(s.to_string()));
            }
            let vocab = schema.vocab(field).ok_or_else(|| GraphError::MissingVocabulary {
                property: field.to_string(),
            })?;
            return Ok(Value::Uri(format!("{vocab}{s}")));
        }

        let invalid = |expected: PropertyType| GraphError::InvalidLiteral {
            property: field.to_string(),
            value: s.to_string(),
            expected,
        };
        match declared {
            None => {
                warn!(property = field, "no type for property, defaulting to string");
                Ok(Value::String(s.to_string()))
            }
            Some(PropertyType::String) => Ok(Value::String(s.to_string())),
            Some(PropertyType::Integer) => s
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid(PropertyType::Integer)),
            Some(PropertyType::Double) => match s.parse::<f64>() {
                Ok(d) if d.is_finite() => Ok(Value::Double(d)),
                _ => Err(invalid(PropertyType::Double)),
            },
            Some(PropertyType::Boolean) => match s {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid(PropertyType::Boolean)),
            },
            Some(_) => Err(GraphError::UnknownDatatype {
                property: field.to_string(),
                datatype: schema.property_datatype(field).unwrap_or_default().to_string(),
            }),
        }
    }

    /// A node-valued string that is not an id of this graph.
    fn reference_value(&self, s: &str) -> Result<Value, GraphError> {
        if vocab::is_listed_license_uri(s) {
            return self.listed_license_value(s);
        }
        if is_blank(s) {
            return self
                .blank_id(s)
                .and_then(|id| self.store.typed_node(&id))
                .map(Value::Node)
                .ok_or_else(|| GraphError::UnresolvableReference { id: s.to_string() });
        }
        if vocab::is_individual(s) {
            return Ok(Value::Uri(s.to_string()));
        }
        if is_absolute(s) {
            return Ok(Value::External(s.to_string()));
        }
        Err(GraphError::UnresolvableReference { id: s.to_string() })
    }

    /// Copies a listed license or exception from the repository, or keeps an
    /// external reference if it is not listed.
    fn listed_license_value(&self, uri: &str) -> Result<Value, GraphError> {
        let listed = match (&self.licenses, listed_license_or_exception_id(uri)) {
            (Some(licenses), Some(id)) => {
                licenses.is_listed_license_id(id) || licenses.is_listed_exception_id(id)
            }
            _ => false,
        };
        if !listed {
            return Ok(Value::External(uri.to_string()));
        }
        if let Some(existing) = self.store.typed_node(uri) {
            return Ok(Value::Node(existing));
        }
        let licenses = self.licenses.as_ref().ok_or_else(|| GraphError::UnresolvableReference {
            id: uri.to_string(),
        })?;
        Ok(Value::Node(copy_node(self.store.as_ref(), licenses.store(), uri)?))
    }
}

fn number_value(field: &str, n: &Number, declared: Option<PropertyType>) -> Result<Value, GraphError> {
    let invalid = |expected: PropertyType| GraphError::InvalidLiteral {
        property: field.to_string(),
        value: n.to_string(),
        expected,
    };
    match declared {
        None => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Double))
            .ok_or_else(|| invalid(PropertyType::Double)),
        Some(PropertyType::Integer) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| invalid(PropertyType::Integer)),
        Some(PropertyType::Double) => n
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| invalid(PropertyType::Double)),
        Some(PropertyType::String) => Ok(Value::String(n.to_string())),
        Some(expected) => Err(GraphError::TypeMismatch {
            property: field.to_string(),
            expected,
            found: "number",
        }),
    }
}
