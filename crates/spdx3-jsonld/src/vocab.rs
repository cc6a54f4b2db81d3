//! Well-known namespaces, identifiers and property names of the SPDX 3 model.
//!
//! Property descriptors built here use the namespace of the latest supported
//! spec version. Descriptors derived from a loaded schema (see
//! [`JsonLdSchema::property_descriptor`](crate::schema::JsonLdSchema::property_descriptor))
//! are authoritative for other versions.

use crate::model::PropertyDescriptor;
use crate::LATEST_SPEC_VERSION;

/// Namespace of the SPDX listed licenses and exceptions.
pub const LISTED_LICENSE_NAMESPACE: &str = "http://spdx.org/licenses/";

/// Prefix for ids minted when serializing anonymous elements.
pub const GENERATED_PREFIX: &str = "https://generated-prefix/";

/// Prefix for ids of synthesized SPDX documents.
pub const DOCUMENT_ID_PREFIX: &str = "urn:spdx-document:";

/// Prefix of every SPDX 3 terms namespace.
pub const SPDX_RDF_PREFIX: &str = "https://spdx.org/rdf/";

/// Profile name of the core model.
pub const CORE_PROFILE: &str = "Core";

/// JSON field holding the id of an element.
pub const SPDX_ID_FIELD: &str = "spdxId";

/// JSON field holding the id of a non-element object.
pub const AT_ID_FIELD: &str = "@id";

/// JSON field holding the type discriminator.
pub const TYPE_FIELD: &str = "type";

/// Top-level JSON-LD context field.
pub const CONTEXT_FIELD: &str = "@context";

/// Top-level JSON-LD graph field.
pub const GRAPH_FIELD: &str = "@graph";

/// Wire name of the root element class.
pub const ELEMENT_CLASS: &str = "Element";

/// Wire name of the root license expression class.
pub const ANY_LICENSE_INFO_CLASS: &str = "simplelicensing_AnyLicenseInfo";

/// URL of the JSON-LD context for a spec version.
pub fn context_url(spec_version: &str) -> String {
    format!("https://spdx.org/rdf/{spec_version}/spdx-context.jsonld")
}

/// Terms namespace for a spec version (e.g. `https://spdx.org/rdf/3.0.1/terms/`).
pub fn terms_namespace(spec_version: &str) -> String {
    format!("{SPDX_RDF_PREFIX}{spec_version}/terms/")
}

/// Property namespace of a profile for the latest spec version.
pub fn profile_namespace(profile: &str) -> String {
    format!("{}{profile}/", terms_namespace(LATEST_SPEC_VERSION))
}

/// Property descriptor in a profile namespace of the latest spec version.
pub fn property(profile: &str, name: &str) -> PropertyDescriptor {
    PropertyDescriptor::new(profile_namespace(profile), name)
}

/// Property descriptor in the Core profile.
pub fn core(name: &str) -> PropertyDescriptor {
    property(CORE_PROFILE, name)
}

/// Property descriptor in the Software profile.
pub fn software(name: &str) -> PropertyDescriptor {
    property("Software", name)
}

/// Property descriptor in the SimpleLicensing profile.
pub fn simple_licensing(name: &str) -> PropertyDescriptor {
    property("SimpleLicensing", name)
}

/// Property descriptor in the ExpandedLicensing profile.
pub fn expanded_licensing(name: &str) -> PropertyDescriptor {
    property("ExpandedLicensing", name)
}

/// Core property names with special handling in the codec.
pub mod properties {
    pub const CREATION_INFO: &str = "creationInfo";
    pub const SPEC_VERSION: &str = "specVersion";
    pub const ELEMENT: &str = "element";
    pub const ROOT_ELEMENT: &str = "rootElement";
    pub const NAMESPACE_MAP: &str = "namespaceMap";
    pub const IMPORT: &str = "import";
    pub const EXTERNAL_SPDX_ID: &str = "externalSpdxId";
}

/// Core class names with special handling in the codec.
pub mod classes {
    pub const CREATION_INFO: &str = "CreationInfo";
    pub const SPDX_DOCUMENT: &str = "SpdxDocument";
    pub const EXTERNAL_MAP: &str = "ExternalMap";
}

/// Named individuals of the SPDX 3 model, as `Profile/Name` suffixes.
const INDIVIDUALS: &[&str] = &[
    "Core/NoAssertionElement",
    "Core/NoneElement",
    "Core/SpdxOrganization",
    "ExpandedLicensing/NoAssertionLicense",
    "ExpandedLicensing/NoneLicense",
];

/// Returns the `Profile/Name` suffix if `uri` names an SPDX individual.
pub fn individual_name(uri: &str) -> Option<&'static str> {
    let rest = uri.strip_prefix(SPDX_RDF_PREFIX)?;
    let (_version, term) = rest.split_once("/terms/")?;
    INDIVIDUALS.iter().copied().find(|name| *name == term)
}

/// True if `uri` names an SPDX individual in any spec version.
pub fn is_individual(uri: &str) -> bool {
    individual_name(uri).is_some()
}

/// True if `id` falls in the listed license/exception namespace.
pub fn is_listed_license_uri(id: &str) -> bool {
    id.starts_with(LISTED_LICENSE_NAMESPACE)
}
