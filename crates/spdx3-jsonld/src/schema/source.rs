//! Locating schema and context resources for a spec version.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value as Json;

use crate::error::SchemaError;

/// File name of the JSON schema for a spec version.
pub fn schema_file_name(spec_version: &str) -> String {
    format!("schema-v{spec_version}.json")
}

/// File name of the JSON-LD context for a spec version.
pub fn context_file_name(spec_version: &str) -> String {
    format!("spdx-context-v{spec_version}.jsonld")
}

/// Supplies the parsed schema and context documents for a spec version.
pub trait SchemaSource: Send + Sync + fmt::Debug {
    fn schema(&self, spec_version: &str) -> Result<Json, SchemaError>;
    fn context(&self, spec_version: &str) -> Result<Json, SchemaError>;
}

fn parse(name: &str, text: &str) -> Result<Json, SchemaError> {
    serde_json::from_str(text).map_err(|source| SchemaError::Parse {
        name: name.to_string(),
        source,
    })
}

const BUNDLED: &[(&str, &str, &str)] = &[(
    "3.0.1",
    include_str!("../../resources/schema-v3.0.1.json"),
    include_str!("../../resources/spdx-context-v3.0.1.jsonld"),
)];

/// Schemas compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSchemas;

impl BundledSchemas {
    /// Spec versions with bundled resources.
    pub fn versions() -> impl Iterator<Item = &'static str> {
        BUNDLED.iter().map(|(version, _, _)| *version)
    }

    fn lookup(spec_version: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
        BUNDLED.iter().find(|(version, _, _)| *version == spec_version)
    }
}

impl SchemaSource for BundledSchemas {
    fn schema(&self, spec_version: &str) -> Result<Json, SchemaError> {
        let name = schema_file_name(spec_version);
        match Self::lookup(spec_version) {
            Some((_, schema, _)) => parse(&name, schema),
            None => Err(SchemaError::ResourceNotFound { name }),
        }
    }

    fn context(&self, spec_version: &str) -> Result<Json, SchemaError> {
        let name = context_file_name(spec_version);
        match Self::lookup(spec_version) {
            Some((_, _, context)) => parse(&name, context),
            None => Err(SchemaError::ResourceNotFound { name }),
        }
    }
}

/// Schemas read from `schema-v{version}.json` and
/// `spdx-context-v{version}.jsonld` in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySchemas {
    root: PathBuf,
}

impl DirectorySchemas {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, name: String) -> Result<Json, SchemaError> {
        let path = self.root.join(&name);
        match std::fs::read_to_string(&path) {
            Ok(text) => parse(&name, &text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SchemaError::ResourceNotFound {
                name: path.display().to_string(),
            }),
            Err(source) => Err(SchemaError::ResourceUnreadable {
                name: path.display().to_string(),
                source,
            }),
        }
    }
}

impl SchemaSource for DirectorySchemas {
    fn schema(&self, spec_version: &str) -> Result<Json, SchemaError> {
        self.read(schema_file_name(spec_version))
    }

    fn context(&self, spec_version: &str) -> Result<Json, SchemaError> {
        self.read(context_file_name(spec_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_latest() {
        let source = BundledSchemas;
        let schema = source.schema("3.0.1").unwrap();
        assert!(schema.pointer("/$defs/AnyClass/anyOf").is_some());
        let context = source.context("3.0.1").unwrap();
        assert!(context.get("@context").is_some());
        assert_eq!(BundledSchemas::versions().collect::<Vec<_>>(), vec!["3.0.1"]);
    }

    #[test]
    fn test_bundled_unknown_version() {
        assert!(matches!(
            BundledSchemas.schema("2.3"),
            Err(SchemaError::ResourceNotFound { name }) if name == "schema-v2.3.json"
        ));
    }

    #[test]
    fn test_directory_missing_file() {
        let source = DirectorySchemas::new(std::env::temp_dir().join("spdx3-jsonld-no-such-dir"));
        assert!(matches!(
            source.context("3.0.1"),
            Err(SchemaError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_directory_reads_resources() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources");
        let source = DirectorySchemas::new(dir);
        assert!(source.schema("3.0.1").is_ok());
        assert!(source.context("3.0.1").is_ok());
    }
}
