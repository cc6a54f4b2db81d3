//! JSON-LD context terms.

use rustc_hash::FxHashMap;
use serde_json::Value as Json;

use crate::error::SchemaError;

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Value kind a property accepts, classified from its context `@type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Boolean,
    Integer,
    Double,
    /// Strings, dates, durations, tokens and URIs.
    String,
    /// `@id`: the value is a node.
    Reference,
    /// `@vocab`: the value is an enumeration member.
    Vocabulary,
    /// A datatype outside the recognized XSD families.
    Other(String),
}

impl PropertyType {
    /// Classifies a context `@type` value.
    pub fn from_datatype(datatype: &str) -> Self {
        match datatype {
            "@id" => return PropertyType::Reference,
            "@vocab" => return PropertyType::Vocabulary,
            _ => {}
        }
        match datatype.strip_prefix(XSD) {
            Some("boolean") => PropertyType::Boolean,
            Some(
                "integer" | "nonPositiveInteger" | "nonNegativeInteger" | "positiveInteger"
                | "negativeInteger" | "long",
            ) => PropertyType::Integer,
            Some("decimal" | "float" | "double") => PropertyType::Double,
            Some(
                "duration" | "dateType" | "dateTime" | "dateTimeStamp" | "time" | "date" | "string"
                | "normalizedString" | "token" | "language" | "anyURI",
            ) => PropertyType::String,
            _ => PropertyType::Other(datatype.to_string()),
        }
    }
}

/// Term definition for a property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTerm {
    /// `@id`: the property IRI.
    pub id: Option<String>,
    /// `@type`.
    pub datatype: Option<String>,
    /// `@context.@vocab` for enumeration-valued properties.
    pub vocab: Option<String>,
}

/// A context entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextTerm {
    /// Plain IRI mapping (class names, keyword aliases, prefixes).
    Iri(String),
    Property(PropertyTerm),
}

/// The term definitions of a JSON-LD context document.
#[derive(Debug, Clone, Default)]
pub struct JsonLdContext {
    terms: FxHashMap<String, ContextTerm>,
}

impl JsonLdContext {
    /// Parses a context document (`{"@context": {...}}`).
    pub fn parse(name: &str, document: &Json) -> Result<Self, SchemaError> {
        let context = document
            .get("@context")
            .and_then(Json::as_object)
            .ok_or_else(|| SchemaError::MissingContext {
                name: name.to_string(),
            })?;

        let mut terms = FxHashMap::default();
        for (term, definition) in context {
            let parsed = match definition {
                Json::String(iri) => ContextTerm::Iri(iri.clone()),
                Json::Object(obj) => ContextTerm::Property(PropertyTerm {
                    id: obj.get("@id").and_then(Json::as_str).map(str::to_string),
                    datatype: obj.get("@type").and_then(Json::as_str).map(str::to_string),
                    vocab: obj
                        .get("@context")
                        .and_then(|c| c.get("@vocab"))
                        .and_then(Json::as_str)
                        .map(str::to_string),
                }),
                _ => continue,
            };
            terms.insert(term.clone(), parsed);
        }
        Ok(Self { terms })
    }

    pub fn term(&self, name: &str) -> Option<&ContextTerm> {
        self.terms.get(name)
    }

    /// IRI of a plain term such as a class name.
    pub fn iri(&self, name: &str) -> Option<&str> {
        match self.terms.get(name)? {
            ContextTerm::Iri(iri) => Some(iri),
            ContextTerm::Property(_) => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyTerm> {
        match self.terms.get(name)? {
            ContextTerm::Property(term) => Some(term),
            ContextTerm::Iri(_) => None,
        }
    }

    /// All distinct `@vocab` prefixes, longest first.
    pub fn vocabularies(&self) -> Vec<String> {
        let mut vocabs: Vec<String> = self
            .terms
            .values()
            .filter_map(|term| match term {
                ContextTerm::Property(PropertyTerm { vocab: Some(v), .. }) => Some(v.clone()),
                _ => None,
            })
            .collect();
        vocabs.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        vocabs.dedup();
        vocabs
    }
}
