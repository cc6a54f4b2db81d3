//! A [`ModelStore`] that reads and writes SPDX 3 JSON-LD documents.

use std::io::{Read, Write};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::Value as Json;
use tracing::debug;

use crate::codec::canonical::kind_name;
use crate::codec::deserializer::node_id;
use crate::codec::{elements_to_document, GraphDeserializer, GraphSerializer, SerializeOptions};
use crate::error::{GraphError, StoreError};
use crate::license::LicenseRepository;
use crate::model::id::is_blank;
use crate::model::{PropertyDescriptor, TypeName, TypedNode, Value};
use crate::schema::SchemaCache;
use crate::store::{IdKind, LockMode, ModelStore, StoreLock};
use crate::vocab::GRAPH_FIELD;

/// Settings of a [`JsonLdStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLdStoreOptions {
    /// Render license expressions as strings and indent the output.
    pub pretty: bool,
    /// Leave listed licenses and exceptions out of serialized graphs.
    pub use_external_listed_elements: bool,
}

impl Default for JsonLdStoreOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            use_external_listed_elements: false,
        }
    }
}

/// Wraps a base store with JSON-LD `serialize` and `deserialize`.
///
/// All [`ModelStore`] calls are forwarded to the base store.
pub struct JsonLdStore<S: ModelStore + 'static> {
    base: Arc<S>,
    cache: Arc<SchemaCache>,
    licenses: Option<Arc<dyn LicenseRepository>>,
    options: JsonLdStoreOptions,
}

impl<S: ModelStore + 'static> JsonLdStore<S> {
    pub fn new(base: S, cache: Arc<SchemaCache>) -> Self {
        Self::with_shared_base(Arc::new(base), cache)
    }

    /// Creates a store over a base store that callers keep using directly.
    pub fn with_shared_base(base: Arc<S>, cache: Arc<SchemaCache>) -> Self {
        Self {
            base,
            cache,
            licenses: None,
            options: JsonLdStoreOptions::default(),
        }
    }

    /// Resolves listed license references while deserializing.
    pub fn with_license_repository(mut self, licenses: Arc<dyn LicenseRepository>) -> Self {
        self.licenses = Some(licenses);
        self
    }

    pub fn with_options(mut self, options: JsonLdStoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn options(&self) -> JsonLdStoreOptions {
        self.options
    }

    pub fn pretty(&self) -> bool {
        self.options.pretty
    }

    pub fn set_pretty(&mut self, pretty: bool) {
        self.options.pretty = pretty;
    }

    pub fn use_external_listed_elements(&self) -> bool {
        self.options.use_external_listed_elements
    }

    pub fn set_use_external_listed_elements(&mut self, external: bool) {
        self.options.use_external_listed_elements = external;
    }

    /// Options handed to the serializer, always at the latest spec version.
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .with_pretty(self.options.pretty)
            .with_external_listed_elements(self.options.use_external_listed_elements)
            .with_spec_version(self.cache.latest_version())
    }

    // =========================================================================
    // SERIALIZE
    // =========================================================================

    /// Builds the JSON-LD document for `selection`, or for the whole store.
    pub fn to_json(&self, selection: Option<&TypedNode>) -> Result<Json, GraphError> {
        GraphSerializer::new(self.base.as_ref(), &self.cache, self.serialize_options())?.serialize(selection)
    }

    /// Writes the JSON-LD document for `selection` to `writer`.
    pub fn serialize<W: Write>(&self, writer: W, selection: Option<&TypedNode>) -> Result<(), GraphError> {
        let document = self.to_json(selection)?;
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, &document)?;
        } else {
            serde_json::to_writer(writer, &document)?;
        }
        Ok(())
    }

    pub fn to_vec(&self, selection: Option<&TypedNode>) -> Result<Vec<u8>, GraphError> {
        let mut bytes = Vec::new();
        self.serialize(&mut bytes, selection)?;
        Ok(bytes)
    }

    // =========================================================================
    // DESERIALIZE
    // =========================================================================

    /// Reads a JSON-LD document into the store and returns its `SpdxDocument`.
    ///
    /// The document is either `{"@graph": [...]}` or a single element object.
    /// Unless `overwrite` is set, the call fails with
    /// [`GraphError::OverwriteConflict`] before changing the store if any
    /// element id in the input already exists.
    pub fn deserialize<R: Read>(&self, reader: R, overwrite: bool) -> Result<TypedNode, GraphError> {
        let root: Json = serde_json::from_reader(reader)?;
        self.deserialize_value(&root, overwrite)
    }

    /// [`deserialize`](Self::deserialize) for an already parsed document.
    pub fn deserialize_value(&self, root: &Json, overwrite: bool) -> Result<TypedNode, GraphError> {
        let _lock = self.base.enter_critical_section(LockMode::Write);
        if !root.is_object() {
            return Err(GraphError::InvalidRoot {
                found: kind_name(root),
            });
        }
        if !overwrite {
            let existing = self.existing_ids(root);
            if !existing.is_empty() {
                return Err(GraphError::overwrite_conflict(existing));
            }
        }

        // Blank ids are scoped to one document.
        let deserializer = self.deserializer();
        let latest = self.cache.latest_version();
        let nodes = match root.get(GRAPH_FIELD) {
            Some(graph) => deserializer.deserialize_graph(graph, latest)?,
            None => vec![deserializer.deserialize_element(root, latest)?],
        };
        debug!(count = nodes.len(), "deserialized elements");
        elements_to_document(self.base.as_ref(), &self.cache, &nodes)
    }

    fn deserializer(&self) -> GraphDeserializer {
        let deserializer = GraphDeserializer::new(self.base.clone() as Arc<dyn ModelStore>, self.cache.clone());
        match &self.licenses {
            Some(licenses) => deserializer.with_license_repository(licenses.clone()),
            None => deserializer,
        }
    }

    /// Ids in `root` that name nodes already in the store, in input order.
    fn existing_ids(&self, root: &Json) -> Vec<String> {
        let candidates: Vec<&Json> = match root.get(GRAPH_FIELD) {
            Some(Json::Array(entries)) => entries.iter().collect(),
            Some(_) => Vec::new(),
            None => vec![root],
        };
        let mut seen = FxHashSet::default();
        candidates
            .into_iter()
            .filter_map(node_id)
            .filter(|id| !is_blank(id) && !self.base.is_anon(id) && self.base.exists(id))
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }
}

impl<S: ModelStore + 'static> ModelStore for JsonLdStore<S> {
    fn create(&self, node: &TypedNode) -> Result<(), StoreError> {
        self.base.create(node)
    }

    fn exists(&self, id: &str) -> bool {
        self.base.exists(id)
    }

    fn is_anon(&self, id: &str) -> bool {
        self.base.is_anon(id)
    }

    fn next_id(&self, kind: IdKind) -> String {
        self.base.next_id(kind)
    }

    fn typed_node(&self, id: &str) -> Option<TypedNode> {
        self.base.typed_node(id)
    }

    fn get_value(&self, id: &str, property: &PropertyDescriptor) -> Result<Option<Value>, StoreError> {
        self.base.get_value(id, property)
    }

    fn set_value(&self, id: &str, property: &PropertyDescriptor, value: Value) -> Result<(), StoreError> {
        self.base.set_value(id, property, value)
    }

    fn add_value_to_collection(
        &self,
        id: &str,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<(), StoreError> {
        self.base.add_value_to_collection(id, property, value)
    }

    fn clear_collection(&self, id: &str, property: &PropertyDescriptor) -> Result<(), StoreError> {
        self.base.clear_collection(id, property)
    }

    fn list_values(&self, id: &str, property: &PropertyDescriptor) -> Result<Vec<Value>, StoreError> {
        self.base.list_values(id, property)
    }

    fn is_collection_property(&self, id: &str, property: &PropertyDescriptor) -> Result<bool, StoreError> {
        self.base.is_collection_property(id, property)
    }

    fn property_descriptors(&self, id: &str) -> Result<Vec<PropertyDescriptor>, StoreError> {
        self.base.property_descriptors(id)
    }

    fn nodes_of_type(&self, type_name: Option<&TypeName>) -> Vec<TypedNode> {
        self.base.nodes_of_type(type_name)
    }

    fn enter_critical_section(&self, mode: LockMode) -> StoreLock<'_> {
        self.base.enter_critical_section(mode)
    }
}
