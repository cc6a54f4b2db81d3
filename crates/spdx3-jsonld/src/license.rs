//! Listed license repository and license expression rendering.
//!
//! Listed licenses and exceptions (`http://spdx.org/licenses/<id>`) are not
//! carried by the documents that reference them. The deserializer resolves
//! them from a [`LicenseRepository`]; the serializer renders license
//! expression subtrees as text through a [`LicenseFormatter`] when writing
//! in pretty mode.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::error::StoreError;
use crate::model::{NodeBuilder, TypeName, TypedNode, Value};
use crate::store::{InMemoryStore, ModelStore};
use crate::vocab::{self, LISTED_LICENSE_NAMESPACE};
use crate::LATEST_SPEC_VERSION;

const EXPANDED_LICENSING: &str = "ExpandedLicensing";
const SIMPLE_LICENSING: &str = "SimpleLicensing";

/// The license or exception id of a listed license URI
/// (`http://spdx.org/licenses/MIT` gives `MIT`).
pub fn listed_license_or_exception_id(uri: &str) -> Option<&str> {
    uri.strip_prefix(LISTED_LICENSE_NAMESPACE)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Canonical source of listed licenses and exceptions.
pub trait LicenseRepository: Send + Sync {
    /// True if `id` (without namespace) is a listed license. Ids compare
    /// case-insensitively.
    fn is_listed_license_id(&self, id: &str) -> bool;

    fn is_listed_exception_id(&self, id: &str) -> bool;

    /// Store holding the listed nodes, keyed by their full URI.
    fn store(&self) -> &dyn ModelStore;
}

/// In-memory [`LicenseRepository`].
#[derive(Debug, Default)]
pub struct LicenseCatalog {
    store: InMemoryStore,
    licenses: RwLock<FxHashSet<String>>,
    exceptions: RwLock<FxHashSet<String>>,
}

impl LicenseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listed license `http://spdx.org/licenses/<id>`.
    pub fn add_license(&self, id: &str, name: &str, text: &str) -> Result<TypedNode, StoreError> {
        let node = NodeBuilder::new(
            format!("{LISTED_LICENSE_NAMESPACE}{id}"),
            TypeName::new(EXPANDED_LICENSING, "ListedLicense"),
            LATEST_SPEC_VERSION,
        )
        .set(vocab::core("name"), name)
        .set(vocab::simple_licensing("licenseText"), text)
        .build(&self.store)?;
        self.licenses.write().insert(id.to_lowercase());
        Ok(node)
    }

    /// Adds a listed license exception `http://spdx.org/licenses/<id>`.
    pub fn add_exception(&self, id: &str, name: &str, text: &str) -> Result<TypedNode, StoreError> {
        let node = NodeBuilder::new(
            format!("{LISTED_LICENSE_NAMESPACE}{id}"),
            TypeName::new(EXPANDED_LICENSING, "ListedLicenseException"),
            LATEST_SPEC_VERSION,
        )
        .set(vocab::core("name"), name)
        .set(vocab::expanded_licensing("additionText"), text)
        .build(&self.store)?;
        self.exceptions.write().insert(id.to_lowercase());
        Ok(node)
    }
}

impl LicenseRepository for LicenseCatalog {
    fn is_listed_license_id(&self, id: &str) -> bool {
        self.licenses.read().contains(&id.to_lowercase())
    }

    fn is_listed_exception_id(&self, id: &str) -> bool {
        self.exceptions.read().contains(&id.to_lowercase())
    }

    fn store(&self) -> &dyn ModelStore {
        &self.store
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Renders a license expression subtree as a single string.
pub trait LicenseFormatter: Send + Sync {
    fn format(&self, store: &dyn ModelStore, node: &TypedNode) -> Result<String, StoreError>;
}

/// Renders SPDX license expression syntax.
///
/// ```text
/// (MIT OR Apache-2.0) AND GPL-2.0-only+ WITH Classpath-exception-2.0
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLicenseFormatter;

impl DefaultLicenseFormatter {
    fn format_value(&self, store: &dyn ModelStore, value: &Value) -> Result<String, StoreError> {
        Ok(match value {
            Value::Node(node) => self.format(store, node)?,
            Value::Uri(uri) => match vocab::individual_name(uri) {
                Some("ExpandedLicensing/NoAssertionLicense" | "Core/NoAssertionElement") => {
                    "NOASSERTION".to_string()
                }
                Some("ExpandedLicensing/NoneLicense" | "Core/NoneElement") => "NONE".to_string(),
                _ => local_name(uri).to_string(),
            },
            Value::External(uri) => local_name(uri).to_string(),
            Value::String(text) => text.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Double(d) => d.to_string(),
        })
    }

    fn format_single(
        &self,
        store: &dyn ModelStore,
        node: &TypedNode,
        profile: &str,
        name: &str,
    ) -> Result<String, StoreError> {
        match store.get_value(&node.id, &vocab::property(profile, name))? {
            Some(value) => self.format_value(store, &value),
            None => Ok("NOASSERTION".to_string()),
        }
    }

    fn format_set(&self, store: &dyn ModelStore, node: &TypedNode, operator: &str) -> Result<String, StoreError> {
        let members = store.list_values(&node.id, &vocab::expanded_licensing("member"))?;
        let parts = members
            .iter()
            .map(|member| self.format_value(store, member))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match parts.len() {
            0 => String::new(),
            1 => parts.into_iter().next().unwrap_or_default(),
            _ => format!("({})", parts.join(operator)),
        })
    }
}

/// The license id part of a license URI: the listed id, or the fragment or
/// last path segment of a custom license id.
fn local_name(uri: &str) -> &str {
    if let Some(id) = listed_license_or_exception_id(uri) {
        return id;
    }
    uri.rsplit(['#', '/']).next().filter(|s| !s.is_empty()).unwrap_or(uri)
}

impl LicenseFormatter for DefaultLicenseFormatter {
    fn format(&self, store: &dyn ModelStore, node: &TypedNode) -> Result<String, StoreError> {
        let profile = node.type_name.profile();
        let class = node.type_name.class();
        match (profile, class) {
            (SIMPLE_LICENSING, "LicenseExpression") => {
                self.format_single(store, node, SIMPLE_LICENSING, "licenseExpression")
            }
            (EXPANDED_LICENSING, "ConjunctiveLicenseSet") => self.format_set(store, node, " AND "),
            (EXPANDED_LICENSING, "DisjunctiveLicenseSet") => self.format_set(store, node, " OR "),
            (EXPANDED_LICENSING, "OrLaterOperator") => {
                let subject = self.format_single(store, node, EXPANDED_LICENSING, "subjectLicense")?;
                Ok(format!("{subject}+"))
            }
            (EXPANDED_LICENSING, "WithAdditionOperator") => {
                let subject = self.format_single(store, node, EXPANDED_LICENSING, "subjectExtendableLicense")?;
                let addition = self.format_single(store, node, EXPANDED_LICENSING, "subjectAddition")?;
                Ok(format!("{subject} WITH {addition}"))
            }
            _ => Ok(local_name(&node.id).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(class: &str) -> TypeName {
        TypeName::new(EXPANDED_LICENSING, class)
    }

    #[test]
    fn test_listed_id() {
        assert_eq!(listed_license_or_exception_id("http://spdx.org/licenses/MIT"), Some("MIT"));
        assert_eq!(listed_license_or_exception_id("http://spdx.org/licenses/"), None);
        assert_eq!(listed_license_or_exception_id("https://example.com/MIT"), None);
    }

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        let catalog = LicenseCatalog::new();
        catalog.add_license("Apache-2.0", "Apache License 2.0", "...").unwrap();
        catalog
            .add_exception("Classpath-exception-2.0", "Classpath exception 2.0", "...")
            .unwrap();
        assert!(catalog.is_listed_license_id("apache-2.0"));
        assert!(!catalog.is_listed_license_id("Classpath-exception-2.0"));
        assert!(catalog.is_listed_exception_id("Classpath-exception-2.0"));
        assert!(catalog.store().exists("http://spdx.org/licenses/Apache-2.0"));
    }

    #[test]
    fn test_format_compound_expression() {
        let store = InMemoryStore::new();
        let mit = TypedNode::new("http://spdx.org/licenses/MIT", expanded("ListedLicense"), "3.0.1");
        let apache = TypedNode::new("http://spdx.org/licenses/Apache-2.0", expanded("ListedLicense"), "3.0.1");
        let gpl = TypedNode::new("http://spdx.org/licenses/GPL-2.0-only", expanded("ListedLicense"), "3.0.1");
        let classpath = TypedNode::new(
            "http://spdx.org/licenses/Classpath-exception-2.0",
            expanded("ListedLicenseException"),
            "3.0.1",
        );
        for node in [&mit, &apache, &gpl, &classpath] {
            store.create(node).unwrap();
        }

        let or_set = NodeBuilder::anonymous(&store, expanded("DisjunctiveLicenseSet"), "3.0.1")
            .add(vocab::expanded_licensing("member"), &mit)
            .add(vocab::expanded_licensing("member"), &apache)
            .build(&store)
            .unwrap();
        let or_later = NodeBuilder::anonymous(&store, expanded("OrLaterOperator"), "3.0.1")
            .set(vocab::expanded_licensing("subjectLicense"), &gpl)
            .build(&store)
            .unwrap();
        let with = NodeBuilder::anonymous(&store, expanded("WithAdditionOperator"), "3.0.1")
            .set(vocab::expanded_licensing("subjectExtendableLicense"), &or_later)
            .set(vocab::expanded_licensing("subjectAddition"), &classpath)
            .build(&store)
            .unwrap();
        let and_set = NodeBuilder::anonymous(&store, expanded("ConjunctiveLicenseSet"), "3.0.1")
            .add(vocab::expanded_licensing("member"), &or_set)
            .add(vocab::expanded_licensing("member"), &with)
            .build(&store)
            .unwrap();

        let text = DefaultLicenseFormatter.format(&store, &and_set).unwrap();
        assert_eq!(
            text,
            "((MIT OR Apache-2.0) AND GPL-2.0-only+ WITH Classpath-exception-2.0)"
        );
    }

    #[test]
    fn test_format_expression_literal_and_individuals() {
        let store = InMemoryStore::new();
        let literal = NodeBuilder::anonymous(&store, TypeName::new(SIMPLE_LICENSING, "LicenseExpression"), "3.0.1")
            .set(vocab::simple_licensing("licenseExpression"), "MIT OR 0BSD")
            .build(&store)
            .unwrap();
        assert_eq!(DefaultLicenseFormatter.format(&store, &literal).unwrap(), "MIT OR 0BSD");

        let none = Value::Uri("https://spdx.org/rdf/3.0.1/terms/ExpandedLicensing/NoneLicense".into());
        assert_eq!(DefaultLicenseFormatter.format_value(&store, &none).unwrap(), "NONE");

        let custom = TypedNode::new("https://example.com/licenses#LicenseRef-Proprietary", expanded("CustomLicense"), "3.0.1");
        store.create(&custom).unwrap();
        assert_eq!(
            DefaultLicenseFormatter.format(&store, &custom).unwrap(),
            "LicenseRef-Proprietary"
        );
    }
}
