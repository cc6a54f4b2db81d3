//! Store to JSON-LD graph serialization.
//!
//! Output layout:
//!
//! ```text
//! { "@context": "https://spdx.org/rdf/<version>/spdx-context.jsonld",
//!   "@graph": [ creation infos, elements, ... ] }     canonical order
//! ```
//!
//! Creation infos are written once as their own entries (`_:creationInfo_N`)
//! and referenced by id. Elements are referenced by id wherever they appear
//! as a property value; other nodes are inlined.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Number, Value as Json};
use tracing::{debug, warn};

use crate::codec::canonical;
use crate::codec::policy::{self, ReferencePolicy};
use crate::error::{GraphError, StoreError};
use crate::license::{DefaultLicenseFormatter, LicenseFormatter};
use crate::model::id::{creation_info_id, generated_element_id};
use crate::model::{PropertyDescriptor, TypeName, TypedNode, Value};
use crate::schema::{JsonLdSchema, SchemaCache};
use crate::store::{IdKind, LockMode, ModelStore};
use crate::vocab::{
    self, classes, context_url, properties, AT_ID_FIELD, CONTEXT_FIELD, GRAPH_FIELD, SPDX_ID_FIELD, TYPE_FIELD,
};
use crate::LATEST_SPEC_VERSION;

/// Options for serializing a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Write license expression subtrees as expression strings instead of
    /// nested objects.
    pub pretty: bool,
    /// Leave out nodes in the listed license namespace. References to them
    /// are still written as ids.
    pub use_external_listed_elements: bool,
    /// Spec version of the schema and context used for output.
    pub spec_version: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            use_external_listed_elements: false,
            spec_version: LATEST_SPEC_VERSION.to_string(),
        }
    }
}

impl SerializeOptions {
    /// Creates default options: pretty, listed licenses included, latest version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that inline every non-element node.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_external_listed_elements(mut self, external: bool) -> Self {
        self.use_external_listed_elements = external;
        self
    }

    pub fn with_spec_version(mut self, spec_version: impl Into<String>) -> Self {
        self.spec_version = spec_version.into();
        self
    }
}

/// Nodes selected for output.
#[derive(Debug, Default)]
struct Plan {
    creation_infos: Vec<TypedNode>,
    document: Option<TypedNode>,
    elements: Vec<TypedNode>,
}

/// Properties a graph entry leaves out.
type SkipFn = fn(&PropertyDescriptor) -> bool;

fn keep_all(_: &PropertyDescriptor) -> bool {
    false
}

/// Member lists are implied by the graph itself.
fn skip_document_members(property: &PropertyDescriptor) -> bool {
    property.is_core(properties::ELEMENT) || property.is_core(properties::NAMESPACE_MAP)
}

/// Serializes the contents of a [`ModelStore`] as a JSON-LD graph.
pub struct GraphSerializer<'s> {
    store: &'s dyn ModelStore,
    schema: Arc<JsonLdSchema>,
    options: SerializeOptions,
    formatter: Box<dyn LicenseFormatter>,
}

impl<'s> GraphSerializer<'s> {
    /// Creates a serializer using the schema for `options.spec_version`.
    pub fn new(store: &'s dyn ModelStore, cache: &SchemaCache, options: SerializeOptions) -> Result<Self, GraphError> {
        let schema = cache.get_or_create(&options.spec_version)?;
        Ok(Self {
            store,
            schema,
            options,
            formatter: Box::new(DefaultLicenseFormatter),
        })
    }

    /// Replaces the formatter used for license expressions in pretty mode.
    pub fn with_formatter(mut self, formatter: impl LicenseFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Serializes `selection`, or every element in the store if `None`.
    ///
    /// An `SpdxDocument` selection writes the document, its root elements and
    /// its member elements. Any other element type writes that element alone.
    /// Referenced creation infos are written in every mode.
    pub fn serialize(&self, selection: Option<&TypedNode>) -> Result<Json, GraphError> {
        let _lock = self.store.enter_critical_section(LockMode::Read);
        let plan = self.plan(selection)?;

        let mut ids = FxHashMap::default();
        for (index, info) in plan.creation_infos.iter().enumerate() {
            ids.insert(info.id.clone(), creation_info_id(index));
        }
        for node in plan.document.iter().chain(&plan.elements) {
            self.assign_element_id(node, &mut ids);
        }

        let mut graph = Vec::with_capacity(plan.creation_infos.len() + plan.elements.len() + 1);
        for info in &plan.creation_infos {
            graph.push(self.entry(info, &ids, keep_all)?);
        }
        if let Some(document) = &plan.document {
            graph.push(self.entry(document, &ids, skip_document_members)?);
        }
        for element in &plan.elements {
            graph.push(self.entry(element, &ids, keep_all)?);
        }
        canonical::sort_entries(&mut graph);

        let mut root = Map::new();
        root.insert(CONTEXT_FIELD.to_string(), Json::String(context_url(&self.options.spec_version)));
        root.insert(GRAPH_FIELD.to_string(), Json::Array(graph));
        Ok(Json::Object(root))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn plan(&self, selection: Option<&TypedNode>) -> Result<Plan, GraphError> {
        let Some(selected) = selection else {
            let elements = self
                .schema
                .element_types()
                .iter()
                .flat_map(|type_name| self.store.nodes_of_type(Some(type_name)))
                .filter(|node| !self.is_external_listed(node))
                .collect();
            let creation_infos = self
                .store
                .nodes_of_type(Some(&TypeName::core(classes::CREATION_INFO)));
            return Ok(Plan {
                creation_infos,
                document: None,
                elements,
            });
        };

        let node = self
            .store
            .typed_node(&selected.id)
            .ok_or_else(|| StoreError::NodeNotFound {
                id: selected.id.clone(),
            })?;
        if node.type_name.is_core_class(classes::SPDX_DOCUMENT) {
            self.document_plan(node)
        } else if self.is_external_listed(&node) {
            debug!(id = %node.id, "selected listed element is external");
            Ok(Plan {
                creation_infos: Vec::new(),
                document: None,
                elements: Vec::new(),
            })
        } else if self.schema.is_element_type(&node.type_name) {
            let creation_infos = self.creation_infos_of([&node])?;
            Ok(Plan {
                creation_infos,
                document: None,
                elements: vec![node],
            })
        } else {
            Err(GraphError::UnsupportedSelection {
                id: node.id,
                type_name: node.type_name.to_string(),
            })
        }
    }

    fn document_plan(&self, document: TypedNode) -> Result<Plan, GraphError> {
        let mut members: Vec<TypedNode> = Vec::new();
        let mut seen = FxHashSet::default();
        for name in [properties::ROOT_ELEMENT, properties::ELEMENT] {
            let property = self.core_property(name);
            for value in self.store.list_values(&document.id, &property)? {
                if let Value::Node(member) = value {
                    if member.id != document.id && seen.insert(member.id.clone()) {
                        members.push(member);
                    }
                }
            }
        }

        let mut elements = Vec::with_capacity(members.len());
        for type_name in self.schema.element_types() {
            let mut of_type: Vec<TypedNode> = members
                .iter()
                .filter(|m| &m.type_name == type_name && !self.is_external_listed(m))
                .cloned()
                .collect();
            of_type.sort_by(|a, b| a.id.cmp(&b.id));
            elements.extend(of_type);
        }
        if elements.len() < members.len() {
            debug!(
                document = %document.id,
                skipped = members.len() - elements.len(),
                "document members not written"
            );
        }

        let creation_infos = self.creation_infos_of(std::iter::once(&document).chain(&elements))?;
        Ok(Plan {
            creation_infos,
            document: Some(document),
            elements,
        })
    }

    /// Distinct creation infos referenced by `nodes`, first seen first.
    fn creation_infos_of<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n TypedNode>,
    ) -> Result<Vec<TypedNode>, GraphError> {
        let property = self.core_property(properties::CREATION_INFO);
        let mut seen = FxHashSet::default();
        let mut infos = Vec::new();
        for node in nodes {
            if self.store.is_collection_property(&node.id, &property)? {
                continue;
            }
            if let Some(Value::Node(info)) = self.store.get_value(&node.id, &property)? {
                if seen.insert(info.id.clone()) {
                    infos.push(info);
                }
            }
        }
        Ok(infos)
    }

    fn is_external_listed(&self, node: &TypedNode) -> bool {
        self.options.use_external_listed_elements && vocab::is_listed_license_uri(&node.id)
    }

    /// Core property descriptor in the output schema's namespace.
    fn core_property(&self, name: &str) -> PropertyDescriptor {
        self.schema
            .property_descriptor(name)
            .unwrap_or_else(|| vocab::core(name))
    }

    fn assign_element_id(&self, node: &TypedNode, ids: &mut FxHashMap<String, String>) {
        if !self.store.is_anon(&node.id) || ids.contains_key(&node.id) {
            return;
        }
        let minted = generated_element_id(&self.store.next_id(IdKind::Element));
        warn!(
            id = %node.id,
            assigned = %minted,
            "anonymous top level element, assigning a generated id"
        );
        ids.insert(node.id.clone(), minted);
    }

    // =========================================================================
    // Entries and values
    // =========================================================================

    fn entry(&self, node: &TypedNode, ids: &FxHashMap<String, String>, skip: SkipFn) -> Result<Json, GraphError> {
        let id_field = if self.schema.is_element_type(&node.type_name) {
            SPDX_ID_FIELD
        } else {
            AT_ID_FIELD
        };
        let id = ids.get(&node.id).unwrap_or(&node.id);

        let mut fields = Map::new();
        fields.insert(id_field.to_string(), Json::String(id.clone()));
        fields.insert(TYPE_FIELD.to_string(), Json::String(node.type_name.to_wire()));
        let mut visiting = FxHashSet::default();
        visiting.insert(node.id.clone());
        self.write_properties(node, &mut fields, ids, &mut visiting, skip)?;
        Ok(Json::Object(fields))
    }

    fn write_properties(
        &self,
        node: &TypedNode,
        fields: &mut Map<String, Json>,
        ids: &FxHashMap<String, String>,
        visiting: &mut FxHashSet<String>,
        skip: SkipFn,
    ) -> Result<(), GraphError> {
        for property in self.store.property_descriptors(&node.id)? {
            if skip(&property) {
                continue;
            }
            let name = property.wire_name();
            let json = if self.store.is_collection_property(&node.id, &property)? {
                let values = self.store.list_values(&node.id, &property)?;
                let items = values
                    .iter()
                    .map(|value| self.value(value, &name, ids, visiting))
                    .collect::<Result<Vec<_>, _>>()?;
                Json::Array(items)
            } else {
                match self.store.get_value(&node.id, &property)? {
                    Some(value) => self.value(&value, &name, ids, visiting)?,
                    None => continue,
                }
            };
            fields.insert(name, json);
        }
        Ok(())
    }

    fn value(
        &self,
        value: &Value,
        property: &str,
        ids: &FxHashMap<String, String>,
        visiting: &mut FxHashSet<String>,
    ) -> Result<Json, GraphError> {
        Ok(match value {
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(i) => Json::from(*i),
            Value::Double(d) => Number::from_f64(*d)
                .map(Json::Number)
                .ok_or_else(|| GraphError::NonFiniteNumber {
                    property: property.to_string(),
                })?,
            Value::String(s) => Json::String(s.clone()),
            Value::Uri(uri) => Json::String(self.schema.enum_value_name(uri).unwrap_or(uri).to_string()),
            Value::External(uri) => Json::String(uri.clone()),
            Value::Node(target) => match policy::decide(self.schema.as_ref(), target, ids, self.options.pretty) {
                ReferencePolicy::ElementReference(id) | ReferencePolicy::CreationInfoReference(id) => {
                    Json::String(id)
                }
                ReferencePolicy::LicenseExpression => Json::String(self.formatter.format(self.store, target)?),
                ReferencePolicy::Inline => self.inline(target, ids, visiting)?,
            },
        })
    }

    fn inline(
        &self,
        node: &TypedNode,
        ids: &FxHashMap<String, String>,
        visiting: &mut FxHashSet<String>,
    ) -> Result<Json, GraphError> {
        if !visiting.insert(node.id.clone()) {
            return Err(GraphError::CyclicValue { id: node.id.clone() });
        }
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_string(), Json::String(node.type_name.to_wire()));
        self.write_properties(node, &mut fields, ids, visiting, keep_all)?;
        visiting.remove(&node.id);
        Ok(Json::Object(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::model::NodeBuilder;
    use crate::schema::{BundledSchemas, SchemaSource};
    use crate::store::InMemoryStore;
    use serde_json::json;

    const V: &str = "3.0.1";

    struct Fixture {
        store: InMemoryStore,
        document: TypedNode,
        package: TypedNode,
        relationship: TypedNode,
    }

    fn enum_uri(vocab: &str, name: &str) -> String {
        format!("https://spdx.org/rdf/3.0.1/terms/{vocab}/{name}")
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let info = NodeBuilder::anonymous(&store, TypeName::core("CreationInfo"), V)
            .set(vocab::core("specVersion"), V)
            .set(vocab::core("created"), "2024-03-01T00:00:00Z")
            .build(&store)
            .unwrap();
        let person = NodeBuilder::new("https://example.com/people/alice", TypeName::core("Person"), V)
            .set(vocab::core("name"), "Alice")
            .set(vocab::core("creationInfo"), &info)
            .build(&store)
            .unwrap();
        store
            .add_value_to_collection(&info.id, &vocab::core("createdBy"), Value::from(&person))
            .unwrap();

        let hash = NodeBuilder::anonymous(&store, TypeName::core("Hash"), V)
            .set_uri(vocab::core("algorithm"), enum_uri("Core", "HashAlgorithm/sha256"))
            .set(vocab::core("hashValue"), "a".repeat(64))
            .build(&store)
            .unwrap();
        let mit = NodeBuilder::new(
            "http://spdx.org/licenses/MIT",
            TypeName::new("ExpandedLicensing", "ListedLicense"),
            V,
        )
        .set(vocab::core("creationInfo"), &info)
        .build(&store)
        .unwrap();
        let apache = NodeBuilder::new(
            "http://spdx.org/licenses/Apache-2.0",
            TypeName::new("ExpandedLicensing", "ListedLicense"),
            V,
        )
        .set(vocab::core("creationInfo"), &info)
        .build(&store)
        .unwrap();
        let license = NodeBuilder::anonymous(&store, TypeName::new("ExpandedLicensing", "DisjunctiveLicenseSet"), V)
            .add(vocab::expanded_licensing("member"), &mit)
            .add(vocab::expanded_licensing("member"), &apache)
            .build(&store)
            .unwrap();

        let package = NodeBuilder::anonymous(&store, TypeName::new("Software", "SpdxPackage"), V)
            .set(vocab::core("name"), "libexample")
            .set(vocab::software("packageVersion"), "1.2.3")
            .set(vocab::core("creationInfo"), &info)
            .add(vocab::core("verifiedUsing"), &hash)
            .add_all(
                vocab::software("additionalPurpose"),
                [
                    Value::Uri(enum_uri("Software", "SoftwarePurpose/library")),
                    Value::Uri(enum_uri("Software", "SoftwarePurpose/source")),
                ],
            )
            .build(&store)
            .unwrap();
        let relationship = NodeBuilder::new("https://example.com/rel/1", TypeName::core("Relationship"), V)
            .set(vocab::core("creationInfo"), &info)
            .set(vocab::core("from"), &package)
            .add(vocab::core("to"), &apache)
            .add(vocab::core("to"), Value::External("https://external.example/pkg".into()))
            .set_uri(vocab::core("relationshipType"), enum_uri("Core", "RelationshipType/hasDeclaredLicense"))
            .build(&store)
            .unwrap();
        let declared = NodeBuilder::new("https://example.com/rel/2", TypeName::core("Relationship"), V)
            .set(vocab::core("creationInfo"), &info)
            .set(vocab::core("from"), &package)
            .add(vocab::core("to"), &license)
            .set_uri(vocab::core("relationshipType"), enum_uri("Core", "RelationshipType/hasConcludedLicense"))
            .build(&store)
            .unwrap();
        let document = NodeBuilder::new("https://example.com/doc", TypeName::core("SpdxDocument"), V)
            .set(vocab::core("creationInfo"), &info)
            .add(vocab::core("rootElement"), &package)
            .add_all(
                vocab::core("element"),
                [&package, &relationship, &declared, &person, &mit, &apache],
            )
            .build(&store)
            .unwrap();
        Fixture {
            store,
            document,
            package,
            relationship,
        }
    }

    fn graph(doc: &Json) -> &Vec<Json> {
        doc["@graph"].as_array().unwrap()
    }

    fn find<'a>(doc: &'a Json, id: &str) -> &'a Json {
        graph(doc)
            .iter()
            .find(|e| e.get("spdxId").or_else(|| e.get("@id")).and_then(Json::as_str) == Some(id))
            .unwrap_or_else(|| panic!("no entry {id}"))
    }

    fn serialize(fx: &Fixture, options: SerializeOptions, selection: Option<&TypedNode>) -> Json {
        let cache = SchemaCache::bundled();
        GraphSerializer::new(&fx.store, &cache, options)
            .unwrap()
            .serialize(selection)
            .unwrap()
    }

    #[test]
    fn test_document_mode() {
        let fx = fixture();
        let doc = serialize(&fx, SerializeOptions::default(), Some(&fx.document));
        assert_eq!(doc["@context"], "https://spdx.org/rdf/3.0.1/spdx-context.jsonld");

        let entries = graph(&doc);
        // creation info, document, package, 2 relationships, person, 2 licenses
        assert_eq!(entries.len(), 8);
        let info = &entries[0];
        assert_eq!(info["@id"], "_:creationInfo_0");
        assert_eq!(info["type"], "CreationInfo");
        assert_eq!(info["createdBy"], json!(["https://example.com/people/alice"]));

        let document = find(&doc, "https://example.com/doc");
        assert!(document.get("element").is_none());
        assert_eq!(document["creationInfo"], "_:creationInfo_0");
    }

    #[test]
    fn test_anonymous_element_gets_generated_id() {
        let fx = fixture();
        let doc = serialize(&fx, SerializeOptions::default(), Some(&fx.document));
        let package = graph(&doc)
            .iter()
            .find(|e| e["type"] == "software_Package")
            .unwrap();
        let id = package["spdxId"].as_str().unwrap();
        assert!(id.starts_with("https://generated-prefix/"));
        assert!(!id.contains(&fx.package.id));

        // References use the minted id.
        let relationship = find(&doc, &fx.relationship.id);
        assert_eq!(relationship["from"], id);
        let document = find(&doc, "https://example.com/doc");
        assert_eq!(document["rootElement"], json!([id]));
    }

    #[test]
    fn test_value_conversion() {
        let fx = fixture();
        let doc = serialize(&fx, SerializeOptions::default(), Some(&fx.document));
        let package = graph(&doc)
            .iter()
            .find(|e| e["type"] == "software_Package")
            .unwrap();
        assert_eq!(package["software_packageVersion"], "1.2.3");
        assert_eq!(package["software_additionalPurpose"], json!(["library", "source"]));
        assert_eq!(
            package["verifiedUsing"],
            json!([{"type": "Hash", "algorithm": "sha256", "hashValue": "a".repeat(64)}])
        );

        let relationship = find(&doc, &fx.relationship.id);
        assert_eq!(relationship["relationshipType"], "hasDeclaredLicense");
        assert_eq!(
            relationship["to"],
            json!(["http://spdx.org/licenses/Apache-2.0", "https://external.example/pkg"])
        );
    }

    /// The bundled schema with license expressions detached from `Element`,
    /// so they are values rather than top level elements.
    #[derive(Debug)]
    struct DetachedLicenses;

    impl SchemaSource for DetachedLicenses {
        fn schema(&self, spec_version: &str) -> Result<Json, SchemaError> {
            let mut schema = BundledSchemas.schema(spec_version)?;
            if let Some(parts) = schema
                .pointer_mut("/$defs/simplelicensing_AnyLicenseInfo_props/allOf")
                .and_then(Json::as_array_mut)
            {
                parts.retain(|part| part.get("$ref").is_none());
            }
            Ok(schema)
        }

        fn context(&self, spec_version: &str) -> Result<Json, SchemaError> {
            BundledSchemas.context(spec_version)
        }
    }

    #[test]
    fn test_license_elements_are_referenced() {
        let fx = fixture();
        let doc = serialize(&fx, SerializeOptions::default(), Some(&fx.document));
        let to = &find(&doc, "https://example.com/rel/2")["to"];
        assert!(to[0].is_string());
        assert!(!to[0].as_str().unwrap().starts_with('('));
    }

    #[test]
    fn test_license_expression_policy() {
        let fx = fixture();
        let cache = SchemaCache::new(DetachedLicenses, V);

        let pretty = GraphSerializer::new(&fx.store, &cache, SerializeOptions::default())
            .unwrap()
            .serialize(Some(&fx.document))
            .unwrap();
        assert_eq!(
            find(&pretty, "https://example.com/rel/2")["to"],
            json!(["(MIT OR Apache-2.0)"])
        );
        assert_eq!(find(&pretty, &fx.relationship.id)["to"][0], "Apache-2.0");

        let compact = GraphSerializer::new(&fx.store, &cache, SerializeOptions::compact())
            .unwrap()
            .serialize(Some(&fx.document))
            .unwrap();
        let set = &find(&compact, "https://example.com/rel/2")["to"][0];
        assert_eq!(set["type"], "expandedlicensing_DisjunctiveLicenseSet");
        assert_eq!(
            set["expandedlicensing_member"][0],
            json!({"type": "expandedlicensing_ListedLicense", "creationInfo": "_:creationInfo_0"})
        );
    }

    #[test]
    fn test_external_listed_elements() {
        let fx = fixture();
        let all = serialize(&fx, SerializeOptions::default(), None);
        assert!(graph(&all).iter().any(|e| e["spdxId"] == "http://spdx.org/licenses/MIT"));

        let options = SerializeOptions::default().with_external_listed_elements(true);
        let doc = serialize(&fx, options, None);
        assert!(!graph(&doc).iter().any(|e| e["spdxId"] == "http://spdx.org/licenses/MIT"));
        // Still referenced by id.
        assert_eq!(
            find(&doc, &fx.relationship.id)["to"][0],
            "http://spdx.org/licenses/Apache-2.0"
        );
    }

    #[test]
    fn test_single_element_mode() {
        let fx = fixture();
        let doc = serialize(&fx, SerializeOptions::default(), Some(&fx.relationship));
        let entries = graph(&doc);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["@id"], "_:creationInfo_0");
        assert_eq!(entries[1]["spdxId"], "https://example.com/rel/1");
    }

    #[test]
    fn test_single_listed_element_left_external() {
        let fx = fixture();
        let mit = fx.store.typed_node("http://spdx.org/licenses/MIT").unwrap();

        let doc = serialize(&fx, SerializeOptions::default(), Some(&mit));
        assert!(graph(&doc).iter().any(|e| e["spdxId"] == "http://spdx.org/licenses/MIT"));

        let options = SerializeOptions::default().with_external_listed_elements(true);
        let doc = serialize(&fx, options, Some(&mit));
        assert!(graph(&doc).is_empty());
    }

    #[test]
    fn test_unsupported_selection() {
        let fx = fixture();
        let info = fx.store.nodes_of_type(Some(&TypeName::core("CreationInfo"))).remove(0);
        let cache = SchemaCache::bundled();
        let serializer = GraphSerializer::new(&fx.store, &cache, SerializeOptions::default()).unwrap();
        assert!(matches!(
            serializer.serialize(Some(&info)),
            Err(GraphError::UnsupportedSelection { .. })
        ));
    }

    #[test]
    fn test_output_is_deterministic() {
        let fx = fixture();
        let cache = SchemaCache::bundled();
        let serializer = GraphSerializer::new(&fx.store, &cache, SerializeOptions::default()).unwrap();
        let first = serializer.serialize(Some(&fx.relationship)).unwrap();
        let second = serializer.serialize(Some(&fx.relationship)).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_cyclic_inline_value() {
        let store = InMemoryStore::new();
        let a = TypedNode::new("__anon__a", TypeName::core("ExternalIdentifier"), V);
        let b = TypedNode::new("__anon__b", TypeName::core("ExternalIdentifier"), V);
        store.create(&a).unwrap();
        store.create(&b).unwrap();
        store.set_value(&a.id, &vocab::core("comment"), Value::from(&b)).unwrap();
        store.set_value(&b.id, &vocab::core("comment"), Value::from(&a)).unwrap();
        let person = NodeBuilder::new("https://example.com/p", TypeName::core("Person"), V)
            .add(vocab::core("externalIdentifier"), &a)
            .build(&store)
            .unwrap();

        let cache = SchemaCache::bundled();
        let serializer = GraphSerializer::new(&store, &cache, SerializeOptions::default()).unwrap();
        assert!(matches!(
            serializer.serialize(Some(&person)),
            Err(GraphError::CyclicValue { .. })
        ));
    }

    #[test]
    fn test_non_finite_double() {
        let store = InMemoryStore::new();
        let vuln = NodeBuilder::new(
            "https://example.com/assessment",
            TypeName::new("Security", "CvssV3VulnAssessmentRelationship"),
            V,
        )
        .set(vocab::property("Security", "score"), f64::NAN)
        .build(&store)
        .unwrap();
        let cache = SchemaCache::bundled();
        let serializer = GraphSerializer::new(&store, &cache, SerializeOptions::default()).unwrap();
        assert!(matches!(
            serializer.serialize(Some(&vuln)),
            Err(GraphError::NonFiniteNumber { property }) if property == "security_score"
        ));
    }
}
