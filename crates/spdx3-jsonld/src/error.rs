//! Error types for schema loading, store access and graph (de)serialization.

use thiserror::Error;

use crate::schema::PropertyType;

/// Error codes for the failure families of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Schema or context resource missing or unparsable
    SchemaUnavailable,
    /// E002: Input graph or store content is not valid SPDX data
    InvalidGraphData,
    /// E003: Deserialization would overwrite existing elements
    OverwriteConflict,
    /// E004: Stream read/write failure
    Io,
    /// E005: Failure reported by the backing store
    Store,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::SchemaUnavailable => "E001",
            ErrorCode::InvalidGraphData => "E002",
            ErrorCode::OverwriteConflict => "E003",
            ErrorCode::Io => "E004",
            ErrorCode::Store => "E005",
        }
    }
}

/// Error while loading a JSON schema / JSON-LD context pair.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("[E001] schema resource {name} not found")]
    ResourceNotFound { name: String },

    #[error("[E001] unable to read schema resource {name}: {source}")]
    ResourceUnreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[E001] unable to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("[E001] context document {name} has no @context object")]
    MissingContext { name: String },

    #[error("[E001] schema {name} does not compile: {message}")]
    InvalidSchema { name: String, message: String },
}

impl SchemaError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::SchemaUnavailable
    }
}

/// Error reported by a [`ModelStore`](crate::store::ModelStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("[E005] node {id} not found")]
    NodeNotFound { id: String },

    #[error("[E005] property {property} of {id} is single-valued")]
    NotACollection { id: String, property: String },

    #[error("[E005] property {property} of {id} is multi-valued")]
    IsACollection { id: String, property: String },
}

impl StoreError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Store
    }
}

/// Error during graph serialization or deserialization.
#[derive(Debug, Error)]
pub enum GraphError {
    // === E001: Schema unavailable ===
    #[error(transparent)]
    Schema(#[from] SchemaError),

    // === E002: Invalid graph data ===
    #[error("[E002] object of type {type_name} has no spdxId or @id")]
    MissingId { type_name: String },

    #[error("[E002] object {id} has no type")]
    MissingType { id: String },

    #[error("[E002] unknown type {type_name}")]
    UnknownType { type_name: String },

    #[error("[E002] @graph must be an array")]
    NotAnArray,

    #[error("[E002] document root must be an object, found {found}")]
    InvalidRoot { found: &'static str },

    #[error("[E002] graph entry must be an object, found {found}")]
    InvalidEntry { found: &'static str },

    #[error("[E002] nested array in value of {property}")]
    NestedArray { property: String },

    #[error("[E002] null value for {property}")]
    NullValue { property: String },

    #[error("[E002] no property descriptor for field {property} in spec version {spec_version}")]
    UnknownProperty {
        property: String,
        spec_version: String,
    },

    #[error("[E002] type mismatch for {property}: expected {expected:?}, found JSON {found}")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: &'static str,
    },

    #[error("[E002] value {value:?} of {property} is not a valid {expected:?}")]
    InvalidLiteral {
        property: String,
        value: String,
        expected: PropertyType,
    },

    #[error("[E002] unknown datatype {datatype} for property {property}")]
    UnknownDatatype { property: String, datatype: String },

    #[error("[E002] missing vocabulary for enumeration property {property}")]
    MissingVocabulary { property: String },

    #[error("[E002] can not resolve blank node reference {id}")]
    UnresolvableReference { id: String },

    #[error("[E002] top level element has a blank node id {id}")]
    BlankRoot { id: String },

    #[error("[E002] unsupported type to serialize: {type_name} ({id})")]
    UnsupportedSelection { id: String, type_name: String },

    #[error("[E002] cycle through inlined value {id}")]
    CyclicValue { id: String },

    #[error("[E002] non-finite number in {property}")]
    NonFiniteNumber { property: String },

    // === E003: Overwrite conflict ===
    #[error("[E003] the SPDX element IDs would be overwritten: {}", overwrite_summary(.ids, .total))]
    OverwriteConflict { ids: Vec<String>, total: usize },

    // === E004: I/O ===
    #[error("[E004] {0}")]
    Io(#[from] std::io::Error),

    #[error("[E002] malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    // === E005: Store ===
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Maximum number of conflicting ids listed in an overwrite error.
pub const MAX_REPORTED_CONFLICTS: usize = 5;

fn overwrite_summary(ids: &[String], total: &usize) -> String {
    let mut summary = ids.join(", ");
    if *total > ids.len() {
        summary.push_str(", [more]...");
    }
    summary
}

impl GraphError {
    /// Builds an overwrite conflict from the full list of clashing ids.
    pub fn overwrite_conflict(mut ids: Vec<String>) -> Self {
        let total = ids.len();
        ids.truncate(MAX_REPORTED_CONFLICTS);
        GraphError::OverwriteConflict { ids, total }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::Schema(_) => ErrorCode::SchemaUnavailable,
            GraphError::OverwriteConflict { .. } => ErrorCode::OverwriteConflict,
            GraphError::Io(_) => ErrorCode::Io,
            GraphError::Json(e) if e.is_io() => ErrorCode::Io,
            GraphError::Store(_) => ErrorCode::Store,
            _ => ErrorCode::InvalidGraphData,
        }
    }
}
