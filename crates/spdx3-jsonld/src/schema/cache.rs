//! Per-version schema cache with fallback to the latest version.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::schema::source::{BundledSchemas, SchemaSource};
use crate::schema::JsonLdSchema;
use crate::LATEST_SPEC_VERSION;

/// A requested spec version that was served by the latest schema instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFallback {
    pub requested: String,
    pub resolved: String,
    /// Why the requested version could not be loaded.
    pub reason: String,
}

/// Result of [`SchemaCache::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub schema: Arc<JsonLdSchema>,
    /// Set when the requested version fell back to the latest version.
    pub fallback: Option<VersionFallback>,
}

/// Memoizes one [`JsonLdSchema`] per spec version.
///
/// A version whose resources fail to load is served by the latest version's
/// schema. Every such downgrade is recorded and returned by
/// [`resolve`](Self::resolve) and [`fallbacks`](Self::fallbacks).
#[derive(Debug)]
pub struct SchemaCache {
    source: Box<dyn SchemaSource>,
    latest: String,
    schemas: RwLock<FxHashMap<String, Arc<JsonLdSchema>>>,
    redirects: RwLock<FxHashMap<String, VersionFallback>>,
    fallback_log: Mutex<Vec<VersionFallback>>,
}

impl SchemaCache {
    pub fn new(source: impl SchemaSource + 'static, latest_version: impl Into<String>) -> Self {
        Self {
            source: Box::new(source),
            latest: latest_version.into(),
            schemas: RwLock::new(FxHashMap::default()),
            redirects: RwLock::new(FxHashMap::default()),
            fallback_log: Mutex::new(Vec::new()),
        }
    }

    /// Cache over the bundled schemas, with the latest bundled version.
    pub fn bundled() -> Self {
        Self::new(BundledSchemas, LATEST_SPEC_VERSION)
    }

    pub fn latest_version(&self) -> &str {
        &self.latest
    }

    /// Returns the schema for `spec_version`, or the latest schema if that
    /// version can not be loaded.
    pub fn get_or_create(&self, spec_version: &str) -> Result<Arc<JsonLdSchema>, SchemaError> {
        Ok(self.resolve(spec_version)?.schema)
    }

    /// Like [`get_or_create`](Self::get_or_create), reporting any fallback.
    pub fn resolve(&self, spec_version: &str) -> Result<ResolvedSchema, SchemaError> {
        let cached = self.schemas.read().get(spec_version).cloned();
        if let Some(schema) = cached {
            let fallback = self.redirects.read().get(spec_version).cloned();
            return Ok(ResolvedSchema { schema, fallback });
        }

        let err = match JsonLdSchema::load(self.source.as_ref(), spec_version) {
            Ok(schema) => {
                debug!(spec_version, "loaded schema");
                return Ok(ResolvedSchema {
                    schema: self.memoize(spec_version, schema),
                    fallback: None,
                });
            }
            Err(err) if spec_version == self.latest => return Err(err),
            Err(err) => err,
        };

        warn!(
            requested = spec_version,
            latest = %self.latest,
            error = %err,
            "unable to get a schema for spec version, trying latest spec version"
        );
        let latest = self.load_latest()?;
        let fallback = VersionFallback {
            requested: spec_version.to_string(),
            resolved: self.latest.clone(),
            reason: err.to_string(),
        };

        {
            let mut redirects = self.redirects.write();
            if !redirects.contains_key(spec_version) {
                redirects.insert(spec_version.to_string(), fallback.clone());
                self.fallback_log.lock().push(fallback.clone());
            }
        }
        let schema = self
            .schemas
            .write()
            .entry(spec_version.to_string())
            .or_insert(latest)
            .clone();
        Ok(ResolvedSchema {
            schema,
            fallback: Some(fallback),
        })
    }

    fn load_latest(&self) -> Result<Arc<JsonLdSchema>, SchemaError> {
        let cached = self.schemas.read().get(&self.latest).cloned();
        if let Some(schema) = cached {
            return Ok(schema);
        }
        match JsonLdSchema::load(self.source.as_ref(), &self.latest) {
            Ok(schema) => Ok(self.memoize(&self.latest, schema)),
            Err(err) => {
                tracing::error!(latest = %self.latest, error = %err, "unable to get JSON schema for latest version");
                Err(err)
            }
        }
    }

    /// Inserts unless another caller got there first; returns the cached entry.
    fn memoize(&self, spec_version: &str, schema: JsonLdSchema) -> Arc<JsonLdSchema> {
        self.schemas
            .write()
            .entry(spec_version.to_string())
            .or_insert_with(|| Arc::new(schema))
            .clone()
    }

    /// Every version downgrade observed so far, in order.
    pub fn fallbacks(&self) -> Vec<VersionFallback> {
        self.fallback_log.lock().clone()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as Json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves the bundled 3.0.1 resources under a configurable set of versions.
    #[derive(Debug, Default)]
    struct CountingSource {
        served: Vec<&'static str>,
        loads: Arc<AtomicUsize>,
    }

    impl CountingSource {
        fn serving(versions: &[&'static str]) -> Self {
            Self {
                served: versions.to_vec(),
                loads: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SchemaSource for CountingSource {
        fn schema(&self, spec_version: &str) -> Result<Json, SchemaError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.served.contains(&spec_version) {
                BundledSchemas.schema("3.0.1")
            } else {
                Err(SchemaError::ResourceNotFound {
                    name: format!("schema-v{spec_version}.json"),
                })
            }
        }

        fn context(&self, _spec_version: &str) -> Result<Json, SchemaError> {
            BundledSchemas.context("3.0.1")
        }
    }

    #[test]
    fn test_memoizes_versions() {
        let cache = SchemaCache::bundled();
        let a = cache.get_or_create("3.0.1").unwrap();
        let b = cache.get_or_create("3.0.1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.fallbacks().is_empty());
    }

    #[test]
    fn test_fallback_is_observable() {
        let cache = SchemaCache::new(CountingSource::serving(&["3.0.1"]), "3.0.1");
        let resolved = cache.resolve("3.0.0").unwrap();
        let fallback = resolved.fallback.expect("fallback expected");
        assert_eq!(fallback.requested, "3.0.0");
        assert_eq!(fallback.resolved, "3.0.1");
        assert!(fallback.reason.contains("schema-v3.0.0.json"));
        assert_eq!(resolved.schema.spec_version(), "3.0.1");

        // Later lookups are memoized but still report the downgrade.
        let again = cache.resolve("3.0.0").unwrap();
        assert!(again.fallback.is_some());
        assert!(Arc::ptr_eq(&again.schema, &resolved.schema));
        assert_eq!(cache.fallbacks().len(), 1);
    }

    #[test]
    fn test_no_duplicate_loads() {
        let source = CountingSource::serving(&["3.0.1"]);
        let loads = Arc::clone(&source.loads);
        let cache = SchemaCache::new(source, "3.0.1");
        cache.get_or_create("3.0.1").unwrap();
        cache.get_or_create("3.0.1").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        // One failed attempt for 2.9; the latest schema is already cached.
        cache.get_or_create("2.9").unwrap();
        cache.get_or_create("2.9").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_latest_failure_propagates() {
        let cache = SchemaCache::new(CountingSource::serving(&[]), "3.0.1");
        assert!(matches!(
            cache.get_or_create("3.0.0"),
            Err(SchemaError::ResourceNotFound { .. })
        ));
        assert!(cache.fallbacks().is_empty());
    }

    #[test]
    fn test_concurrent_requests_share_instance() {
        let cache = Arc::new(SchemaCache::bundled());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_create("3.0.1").unwrap())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for schema in &schemas[1..] {
            assert!(Arc::ptr_eq(&schemas[0], schema));
        }
    }
}
