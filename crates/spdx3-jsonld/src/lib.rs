//! SPDX 3: schema-driven JSON-LD serialization for software bill of materials graphs.
//!
//! This crate converts between an object graph held in a [`ModelStore`] and
//! the SPDX 3 JSON-LD wire format. Which properties exist, how their values
//! are typed, and which classes are elements all come from the JSON schema and
//! JSON-LD context published for each spec version.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use spdx3_jsonld::{InMemoryStore, JsonLdStore, ModelStore, SchemaCache};
//!
//! let store = JsonLdStore::new(InMemoryStore::new(), Arc::new(SchemaCache::bundled()));
//! let input = r#"{
//!   "@context": "https://spdx.org/rdf/3.0.1/spdx-context.jsonld",
//!   "@graph": [
//!     { "type": "CreationInfo", "@id": "_:ci", "specVersion": "3.0.1",
//!       "created": "2024-07-22T16:01:15Z" },
//!     { "type": "software_Package", "spdxId": "https://example.com/pkg",
//!       "creationInfo": "_:ci", "name": "Package Name" }
//!   ]
//! }"#;
//!
//! // Read the graph; a document wrapping the package is created
//! let document = store.deserialize(input.as_bytes(), false).unwrap();
//! assert!(document.type_name.is_core_class("SpdxDocument"));
//!
//! // Write the package back out
//! let package = store.typed_node("https://example.com/pkg").unwrap();
//! let bytes = store.to_vec(Some(&package)).unwrap();
//! assert!(String::from_utf8(bytes).unwrap().contains("Package Name"));
//! ```
//!
//! # Modules
//!
//! - [`schema`]: Schema service and the per-version schema cache
//! - [`codec`]: Graph serializer, deserializer and document reconstruction
//! - [`model`]: Node ids, type names, property descriptors and values
//! - [`store`]: The store interface and an in-memory implementation
//! - [`license`]: Listed license repository and expression formatting
//! - [`jsonld_store`]: Store wrapper with `serialize` and `deserialize`
//! - [`vocab`]: Well-known namespaces and property names
//! - [`error`]: Error types
//!
//! # Wire Format
//!
//! A document is `{"@context": <url>, "@graph": [...]}`. Elements carry
//! `spdxId`, other shared objects (creation infos) carry a blank `@id`, and
//! everything else is written inline. Output entries are sorted, so
//! serializing the same graph twice gives identical bytes.

pub mod codec;
pub mod error;
pub mod jsonld_store;
pub mod license;
pub mod model;
pub mod schema;
pub mod store;
pub mod vocab;

// Re-export commonly used types at crate root
pub use codec::{elements_to_document, GraphDeserializer, GraphSerializer, ReferencePolicy, SerializeOptions};
pub use error::{ErrorCode, GraphError, SchemaError, StoreError};
pub use jsonld_store::{JsonLdStore, JsonLdStoreOptions};
pub use license::{DefaultLicenseFormatter, LicenseCatalog, LicenseFormatter, LicenseRepository};
pub use model::{NodeBuilder, PropertyDescriptor, TypeName, TypedNode, Value};
pub use schema::{
    BundledSchemas, DirectorySchemas, JsonLdSchema, PropertyType, ResolvedSchema, SchemaCache, SchemaSource,
    VersionFallback,
};
pub use store::{copy_node, IdKind, InMemoryStore, LockMode, ModelStore, StoreLock};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Latest SPDX spec version this crate bundles a schema for.
pub const LATEST_SPEC_VERSION: &str = "3.0.1";
