//! Typed nodes and property descriptors.

use std::fmt;

use crate::model::type_name::TypeName;
use crate::vocab::CORE_PROFILE;

/// A store object: its id, type and the spec version it was created under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedNode {
    pub id: String,
    pub type_name: TypeName,
    pub spec_version: String,
}

impl TypedNode {
    pub fn new(id: impl Into<String>, type_name: TypeName, spec_version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name,
            spec_version: spec_version.into(),
        }
    }
}

/// Identifies a property by namespace and name.
///
/// The namespace is the property IRI up to and including its last `/`
/// (e.g. `https://spdx.org/rdf/3.0.1/terms/Software/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyDescriptor {
    namespace: String,
    name: String,
}

impl PropertyDescriptor {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Splits a property IRI at its last `/`.
    pub fn from_iri(iri: &str) -> Option<Self> {
        let split = iri.rfind('/')? + 1;
        let (namespace, name) = iri.split_at(split);
        if name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The profile this property belongs to: the last segment of the namespace.
    pub fn profile(&self) -> &str {
        let trimmed = self.namespace.strip_suffix('/').unwrap_or(&self.namespace);
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// True if this is the Core property `name`.
    pub fn is_core(&self, name: &str) -> bool {
        self.profile() == CORE_PROFILE && self.name == name
    }

    /// JSON field name: bare for Core, else `lowercase(profile)_name`.
    pub fn wire_name(&self) -> String {
        let profile = self.profile();
        if profile == CORE_PROFILE {
            self.name.clone()
        } else {
            format!("{}_{}", profile.to_lowercase(), self.name)
        }
    }
}

impl fmt::Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.name)
    }
}
