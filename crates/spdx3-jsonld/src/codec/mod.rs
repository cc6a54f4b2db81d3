//! JSON-LD graph encoding and decoding.
//!
//! - [`serializer`]: store contents to a `{"@context", "@graph"}` document
//! - [`deserializer`]: `@graph` arrays and single elements into a store
//! - [`document`]: wrapping deserialized elements in an `SpdxDocument`
//! - [`canonical`]: the total order used to sort graph entries
//! - [`policy`]: reference versus inline decisions for node values

pub mod canonical;
pub mod deserializer;
pub mod document;
pub mod policy;
pub mod serializer;

pub use deserializer::GraphDeserializer;
pub use document::elements_to_document;
pub use policy::ReferencePolicy;
pub use serializer::{GraphSerializer, SerializeOptions};
