//! Node identifiers.
//!
//! A node id is either a URI or a document-local blank id (`_:` + token).
//! Blank ids never reach the store; the deserializer maps each one to a
//! store-issued anonymous id.

use uuid::Uuid;

use crate::vocab::{DOCUMENT_ID_PREFIX, GENERATED_PREFIX};

/// Prefix of document-local blank node ids.
pub const BLANK_PREFIX: &str = "_:";

/// Prefix of the blank ids assigned to serialized creation infos.
pub const CREATION_INFO_ID_PREFIX: &str = "_:creationInfo_";

/// Returns true if `id` is a document-local blank id.
pub fn is_blank(id: &str) -> bool {
    id.starts_with(BLANK_PREFIX)
}

/// Returns true if `iri` starts with a URI scheme (RFC 3986 section 3.1).
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon) => {
            let scheme = &iri[..colon];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Blank id of the `index`th creation info in a serialized graph.
pub fn creation_info_id(index: usize) -> String {
    format!("{CREATION_INFO_ID_PREFIX}{index}")
}

/// Mints a URI for an anonymous element being serialized.
///
/// ```text
/// https://generated-prefix/<uuid>#<store sequence id>
/// ```
pub fn generated_element_id(sequence: &str) -> String {
    format!("{GENERATED_PREFIX}{}#{sequence}", Uuid::new_v4())
}

/// Mints an id for a synthesized SPDX document.
pub fn synthesized_document_id() -> String {
    format!("{DOCUMENT_ID_PREFIX}{}", Uuid::new_v4())
}
