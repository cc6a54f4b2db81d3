//! Schema service: class hierarchy, property typing and vocabulary lookups
//! over one spec version's JSON schema and JSON-LD context.
//!
//! Class definitions follow the SPDX JSON schema layout:
//!
//! ```text
//! $defs/AnyClass            anyOf [ $ref <Class>, ... ]
//! $defs/<Class>             allOf [ { properties: { type: oneOf [ const "<Class>" ] } },
//!                                   $ref <Class>_props ]
//! $defs/<Class>_props       allOf [ $ref <Parent>_props, { properties: {...} } ]
//! ```
//!
//! Subclass queries walk the `_props` chain; the wire type of a class is the
//! constant of its `type` property, resolved to a class IRI via the context.

mod cache;
mod context;
mod source;

pub use cache::{ResolvedSchema, SchemaCache, VersionFallback};
pub use context::{ContextTerm, JsonLdContext, PropertyTerm, PropertyType};
pub use source::{context_file_name, schema_file_name, BundledSchemas, DirectorySchemas, SchemaSource};

use std::fmt;
use std::io::Read;

use rustc_hash::FxHashSet;
use serde_json::Value as Json;
use tracing::{error, warn};

use crate::error::SchemaError;
use crate::model::{PropertyDescriptor, TypeName};
use crate::vocab::{ANY_LICENSE_INFO_CLASS, ELEMENT_CLASS};

const DEFS_PREFIX: &str = "#/$defs/";
const ANY_CLASS_POINTER: &str = "/$defs/AnyClass/anyOf";
const PROPS_SUFFIX: &str = "_props";
const MAX_REF_DEPTH: usize = 32;

/// A subschema, with the `$ref` it was reached through.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    pub uri: Option<&'a str>,
    pub node: &'a Json,
}

impl<'a> SchemaNode<'a> {
    /// Definition name for nodes reached through `#/$defs/<name>`.
    pub fn name(&self) -> Option<&'a str> {
        self.uri?.strip_prefix(DEFS_PREFIX)
    }
}

/// Schema and context for one spec version.
pub struct JsonLdSchema {
    spec_version: String,
    root: Json,
    context: JsonLdContext,
    validator: jsonschema::Validator,
    known_types: FxHashSet<TypeName>,
    element_types: Vec<TypeName>,
    element_set: FxHashSet<TypeName>,
    license_expression_types: Vec<TypeName>,
    license_expression_set: FxHashSet<TypeName>,
    enum_vocabularies: Vec<String>,
}

impl fmt::Debug for JsonLdSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLdSchema")
            .field("spec_version", &self.spec_version)
            .field("classes", &self.known_types.len())
            .field("element_types", &self.element_types.len())
            .finish_non_exhaustive()
    }
}

impl JsonLdSchema {
    /// Loads the schema and context for `spec_version` from `source`.
    pub fn load(source: &dyn SchemaSource, spec_version: &str) -> Result<Self, SchemaError> {
        let schema = source.schema(spec_version)?;
        let context = source.context(spec_version)?;
        Self::from_documents(spec_version, schema, &context)
    }

    /// Builds a schema service from parsed documents.
    pub fn from_documents(spec_version: &str, schema: Json, context: &Json) -> Result<Self, SchemaError> {
        let context = JsonLdContext::parse(&context_file_name(spec_version), context)?;
        let validator = jsonschema::validator_for(&schema).map_err(|e| SchemaError::InvalidSchema {
            name: schema_file_name(spec_version),
            message: e.to_string(),
        })?;
        let enum_vocabularies = context.vocabularies();
        let mut schema = Self {
            spec_version: spec_version.to_string(),
            root: schema,
            context,
            validator,
            known_types: FxHashSet::default(),
            element_types: Vec::new(),
            element_set: FxHashSet::default(),
            license_expression_types: Vec::new(),
            license_expression_set: FxHashSet::default(),
            enum_vocabularies,
        };
        let known_types: FxHashSet<TypeName> = schema
            .all_classes()
            .iter()
            .filter_map(|class| schema.class_type(class))
            .collect();
        let element_types = schema.collect_subclasses(ELEMENT_CLASS);
        let license_expression_types = schema.collect_subclasses(ANY_LICENSE_INFO_CLASS);
        schema.known_types = known_types;
        schema.element_set = element_types.iter().cloned().collect();
        schema.element_types = element_types;
        schema.license_expression_set = license_expression_types.iter().cloned().collect();
        schema.license_expression_types = license_expression_types;
        Ok(schema)
    }

    pub fn spec_version(&self) -> &str {
        &self.spec_version
    }

    pub fn context(&self) -> &JsonLdContext {
        &self.context
    }

    fn collect_subclasses(&self, super_type: &str) -> Vec<TypeName> {
        let mut types = Vec::new();
        for class in self.all_classes() {
            if self.is_subclass_of(super_type, &class) {
                match self.class_type(&class) {
                    Some(t) => types.push(t),
                    None => warn!(class = ?class.uri, "no class type found"),
                }
            }
        }
        types
    }

    // =========================================================================
    // Schema navigation
    // =========================================================================

    /// Follows `$ref` chains from `node`.
    fn resolve<'a>(&'a self, node: &'a Json) -> SchemaNode<'a> {
        let mut current = SchemaNode { uri: None, node };
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.node.get("$ref").and_then(Json::as_str) else {
                break;
            };
            let Some(pointer) = reference.strip_prefix('#') else {
                break;
            };
            match self.root.pointer(pointer) {
                Some(target) => {
                    current = SchemaNode {
                        uri: Some(reference),
                        node: target,
                    }
                }
                None => break,
            }
        }
        current
    }

    fn all_of<'a>(&'a self, node: &'a Json) -> impl Iterator<Item = SchemaNode<'a>> + 'a {
        node.get("allOf")
            .and_then(Json::as_array)
            .into_iter()
            .flatten()
            .map(move |member| self.resolve(member))
    }

    /// All class definitions, from the `AnyClass` union.
    pub fn all_classes(&self) -> Vec<SchemaNode<'_>> {
        self.root
            .pointer(ANY_CLASS_POINTER)
            .and_then(Json::as_array)
            .map(|members| members.iter().map(|m| self.resolve(m)).collect())
            .unwrap_or_default()
    }

    /// Class definition by wire name (e.g. `software_Package`).
    pub fn class_schema(&self, name: &str) -> Option<SchemaNode<'_>> {
        let node = self.root.get("$defs")?.get(name)?;
        Some(SchemaNode {
            uri: self.defs_uri(name),
            node,
        })
    }

    /// Borrowed `#/$defs/<name>` reference for `name`, if some class union
    /// member refers to it.
    fn defs_uri(&self, name: &str) -> Option<&str> {
        self.root
            .pointer(ANY_CLASS_POINTER)?
            .as_array()?
            .iter()
            .filter_map(|m| m.get("$ref").and_then(Json::as_str))
            .find(|r| r.strip_prefix(DEFS_PREFIX) == Some(name))
    }

    /// True if `class` composes the `<super_type>_props` restrictions,
    /// directly or through its ancestors' `_props` definitions.
    pub fn is_subclass_of(&self, super_type: &str, class: &SchemaNode<'_>) -> bool {
        let target = format!("{DEFS_PREFIX}{super_type}{PROPS_SUFFIX}");
        let mut visited = FxHashSet::default();
        self.subclass_walk(&target, class.node, &mut visited)
    }

    fn subclass_walk<'a>(&'a self, target: &str, node: &'a Json, visited: &mut FxHashSet<&'a str>) -> bool {
        for member in self.all_of(node) {
            match member.uri {
                Some(uri) if uri == target => return true,
                Some(uri) if uri.ends_with(PROPS_SUFFIX) && visited.insert(uri) => {
                    if self.subclass_walk(target, member.node, visited) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// True if `name` is declared in the schema's properties, its `$defs`
    /// or any `allOf` member, recursively.
    pub fn has_property(&self, name: &str, schema: &SchemaNode<'_>) -> bool {
        let mut visited = FxHashSet::default();
        self.property_walk(name, schema.node, &mut visited)
    }

    fn property_walk<'a>(&'a self, name: &str, node: &'a Json, visited: &mut FxHashSet<&'a str>) -> bool {
        if node
            .get("properties")
            .and_then(Json::as_object)
            .is_some_and(|props| props.contains_key(name))
        {
            return true;
        }
        if let Some(defs) = node.get("$defs").and_then(Json::as_object) {
            if defs.values().any(|sub| self.property_walk(name, sub, visited)) {
                return true;
            }
        }
        for member in self.all_of(node) {
            if let Some(uri) = member.uri {
                if !visited.insert(uri) {
                    continue;
                }
            }
            if self.property_walk(name, member.node, visited) {
                return true;
            }
        }
        false
    }

    /// The wire type constant of a class (the single `oneOf` const of its
    /// `type` property).
    pub fn type_of<'a>(&'a self, class: &SchemaNode<'a>) -> Option<&'a str> {
        for member in self.all_of(class.node) {
            let Some(type_property) = member.node.get("properties").and_then(|p| p.get("type")) else {
                continue;
            };
            let type_property = self.resolve(type_property);
            let one_of = type_property.node.get("oneOf").and_then(Json::as_array);
            return match one_of.map(Vec::as_slice) {
                Some([single]) => {
                    let constant = single.get("const").and_then(Json::as_str);
                    if constant.is_none() {
                        warn!(class = ?class.uri, "type constant is missing or not a string");
                    }
                    constant
                }
                Some([]) | None => {
                    warn!(class = ?class.uri, "no oneOf for class type property");
                    None
                }
                Some(_) => {
                    warn!(class = ?class.uri, "too many oneOfs for class type property");
                    None
                }
            };
        }
        None
    }

    /// The class IRI of a class, from the context entry of its wire type.
    pub fn type_uri<'a>(&'a self, class: &SchemaNode<'a>) -> Option<&'a str> {
        let wire = self.type_of(class)?;
        let uri = self.context.iri(wire);
        if uri.is_none() {
            warn!(wire_type = wire, "no context entry for class");
        }
        uri
    }

    /// The model type name of a class.
    pub fn class_type(&self, class: &SchemaNode<'_>) -> Option<TypeName> {
        TypeName::from_class_uri(self.type_uri(class)?)
    }

    // =========================================================================
    // Context lookups
    // =========================================================================

    /// Raw context `@type` of a field.
    pub fn property_datatype(&self, field: &str) -> Option<&str> {
        self.context.property(field)?.datatype.as_deref()
    }

    /// Classified context `@type` of a field.
    pub fn property_type(&self, field: &str) -> Option<PropertyType> {
        self.property_datatype(field).map(PropertyType::from_datatype)
    }

    /// Enumeration prefix (`@context.@vocab`) of a field.
    pub fn vocab(&self, field: &str) -> Option<&str> {
        self.context.property(field)?.vocab.as_deref()
    }

    /// Splits the field's `@id` into namespace and name.
    pub fn property_descriptor(&self, field: &str) -> Option<PropertyDescriptor> {
        PropertyDescriptor::from_iri(self.context.property(field)?.id.as_deref()?)
    }

    /// True if the field's values are nodes (`@type: @id`).
    pub fn is_node_valued(&self, field: &str) -> bool {
        self.property_datatype(field) == Some("@id")
    }

    /// True if the field's values are enumeration members (`@type: @vocab`).
    pub fn is_enum(&self, field: &str) -> bool {
        self.property_datatype(field) == Some("@vocab")
    }

    /// Bare member name if `uri` is a value of a known enumeration.
    pub fn enum_value_name<'u>(&self, uri: &'u str) -> Option<&'u str> {
        self.enum_vocabularies.iter().find_map(|vocab| {
            uri.strip_prefix(vocab.as_str())
                .filter(|name| !name.is_empty() && !name.contains('/'))
        })
    }

    // =========================================================================
    // Derived type sets
    // =========================================================================

    /// Subclasses of `Element`, in class enumeration order.
    pub fn element_types(&self) -> &[TypeName] {
        &self.element_types
    }

    /// Subclasses of `simplelicensing_AnyLicenseInfo`, in class enumeration order.
    pub fn license_expression_types(&self) -> &[TypeName] {
        &self.license_expression_types
    }

    pub fn is_element_type(&self, type_name: &TypeName) -> bool {
        self.element_set.contains(type_name)
    }

    pub fn is_license_expression_type(&self, type_name: &TypeName) -> bool {
        self.license_expression_set.contains(type_name)
    }

    pub fn is_known_type(&self, type_name: &TypeName) -> bool {
        self.known_types.contains(type_name)
    }

    /// Parses a wire type and checks it names a class of this schema.
    pub fn type_for_wire(&self, wire: &str) -> Option<TypeName> {
        TypeName::from_wire(wire).filter(|t| self.is_known_type(t))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates a document against the JSON schema. Violations are logged.
    pub fn validate(&self, document: &Json) -> bool {
        let mut valid = true;
        for err in self.validator.iter_errors(document) {
            error!(path = %err.instance_path, "JSON object does not match schema: {err}");
            valid = false;
        }
        valid
    }

    /// Reads and validates a serialized document. Unparsable input is logged
    /// and reported as invalid; read failures are returned.
    pub fn validate_reader<R: Read>(&self, mut reader: R) -> std::io::Result<bool> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        match serde_json::from_slice::<Json>(&bytes) {
            Ok(document) => Ok(self.validate(&document)),
            Err(e) => {
                error!("unable to parse JSON object: {e}");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> JsonLdSchema {
        JsonLdSchema::load(&BundledSchemas, "3.0.1").unwrap()
    }

    #[test]
    fn test_subclass_queries() {
        let s = schema();
        let relationship = s.class_schema("Relationship").unwrap();
        assert!(s.is_subclass_of("Element", &relationship));
        assert!(!s.is_subclass_of("Artifact", &relationship));

        let package = s.class_schema("software_Package").unwrap();
        assert!(s.is_subclass_of("Artifact", &package));
        assert!(s.is_subclass_of("software_SoftwareArtifact", &package));

        let hash = s.class_schema("Hash").unwrap();
        assert!(!s.is_subclass_of("Element", &hash));
        assert!(s.is_subclass_of("IntegrityMethod", &hash));
    }

    #[test]
    fn test_has_property() {
        let s = schema();
        let package = s.class_schema("software_Package").unwrap();
        assert!(s.has_property("software_packageVersion", &package));
        assert!(s.has_property("creationInfo", &package));
        assert!(s.has_property("spdxId", &package));
        assert!(!s.has_property("hashValue", &package));
    }

    #[test]
    fn test_type_lookup() {
        let s = schema();
        let package = s.class_schema("software_Package").unwrap();
        assert_eq!(package.name(), Some("software_Package"));
        assert_eq!(s.type_of(&package), Some("software_Package"));
        assert_eq!(
            s.type_uri(&package),
            Some("https://spdx.org/rdf/3.0.1/terms/Software/Package")
        );
        assert_eq!(
            s.class_type(&package),
            Some(TypeName::new("Software", "SpdxPackage"))
        );
        assert!(s.class_schema("NoSuchClass").is_none());
    }

    #[test]
    fn test_type_of_requires_single_const() {
        let schema_doc = json!({
            "$defs": {
                "AnyClass": {"anyOf": [{"$ref": "#/$defs/Two"}]},
                "Two": {"allOf": [{"type": "object", "properties": {
                    "type": {"oneOf": [{"const": "A"}, {"const": "B"}]}
                }}]}
            }
        });
        let s = JsonLdSchema::from_documents("0.0.1", schema_doc, &json!({"@context": {}})).unwrap();
        let classes = s.all_classes();
        assert_eq!(classes.len(), 1);
        assert_eq!(s.type_of(&classes[0]), None);
        assert!(s.element_types().is_empty());
    }

    #[test]
    fn test_element_type_closure() {
        let s = schema();
        let expected: Vec<TypeName> = s
            .all_classes()
            .iter()
            .filter(|c| s.is_subclass_of("Element", c))
            .filter_map(|c| s.class_type(c))
            .collect();
        assert_eq!(s.element_types(), expected.as_slice());
        assert!(s.is_element_type(&TypeName::core("Element")));
        assert!(s.is_element_type(&TypeName::new("Software", "SpdxFile")));
        assert!(!s.is_element_type(&TypeName::core("CreationInfo")));
        assert!(!s.is_element_type(&TypeName::core("Hash")));

        assert!(s.is_license_expression_type(&TypeName::new("ExpandedLicensing", "ListedLicense")));
        assert!(s.is_license_expression_type(&TypeName::new("SimpleLicensing", "LicenseExpression")));
        assert!(!s.is_license_expression_type(&TypeName::new("ExpandedLicensing", "ListedLicenseException")));
    }

    #[test]
    fn test_property_lookups() {
        let s = schema();
        assert_eq!(s.property_type("name"), Some(PropertyType::String));
        assert_eq!(s.property_type("to"), Some(PropertyType::Reference));
        assert_eq!(s.property_type("security_score"), Some(PropertyType::Double));
        assert_eq!(s.property_type("dataset_datasetSize"), Some(PropertyType::Integer));
        assert_eq!(
            s.property_type("expandedlicensing_isOsiApproved"),
            Some(PropertyType::Boolean)
        );
        assert!(s.is_node_valued("verifiedUsing"));
        assert!(s.is_enum("algorithm"));
        assert_eq!(
            s.vocab("algorithm"),
            Some("https://spdx.org/rdf/3.0.1/terms/Core/HashAlgorithm/")
        );
        let desc = s.property_descriptor("software_packageVersion").unwrap();
        assert_eq!(desc.namespace(), "https://spdx.org/rdf/3.0.1/terms/Software/");
        assert_eq!(desc.name(), "packageVersion");
        assert_eq!(desc.wire_name(), "software_packageVersion");
        assert!(s.property_descriptor("noSuchField").is_none());
    }

    #[test]
    fn test_enum_value_name() {
        let s = schema();
        assert_eq!(
            s.enum_value_name("https://spdx.org/rdf/3.0.1/terms/Core/RelationshipType/contains"),
            Some("contains")
        );
        assert_eq!(
            s.enum_value_name("https://spdx.org/rdf/3.0.1/terms/Core/NoAssertionElement"),
            None
        );
    }

    #[test]
    fn test_wire_types() {
        let s = schema();
        assert_eq!(
            s.type_for_wire("software_File"),
            Some(TypeName::new("Software", "SpdxFile"))
        );
        assert_eq!(s.type_for_wire("software_Nothing"), None);
        assert_eq!(s.type_for_wire("CreationInfo"), Some(TypeName::core("CreationInfo")));
    }

    #[test]
    fn test_validate() {
        let s = schema();
        let valid = json!({
            "@context": "https://spdx.org/rdf/3.0.1/spdx-context.jsonld",
            "@graph": [
                {
                    "type": "CreationInfo",
                    "@id": "_:creationInfo_0",
                    "created": "2024-07-22T16:01:15Z",
                    "createdBy": ["https://example.com/person"],
                    "specVersion": "3.0.1"
                },
                {
                    "type": "Person",
                    "spdxId": "https://example.com/person",
                    "creationInfo": "_:creationInfo_0",
                    "name": "Gary"
                }
            ]
        });
        assert!(s.validate(&valid));

        let missing_context = json!({"@graph": []});
        assert!(!s.validate(&missing_context));

        assert!(!s.validate_reader("{not json".as_bytes()).unwrap());
        assert!(s.validate_reader(valid.to_string().as_bytes()).unwrap());
    }
}
