//! Benchmark for SPDX 3 JSON-LD serialization using a synthetic SBOM.
//!
//! Builds a document with a configurable number of packages (default 5k),
//! each with a hash, a purpose, a dependency relationship and a license.

use std::sync::Arc;
use std::time::Instant;

use spdx3_jsonld::{
    vocab, GraphSerializer, InMemoryStore, JsonLdStore, LicenseCatalog, ModelStore, NodeBuilder, SchemaCache,
    SerializeOptions, TypeName, TypedNode, Value,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SPEC_VERSION: &str = "3.0.1";
const TERMS: &str = "https://spdx.org/rdf/3.0.1/terms";

// =============================================================================
// SYNTHETIC DATA
// =============================================================================

const PURPOSES: &[&str] = &["library", "application", "framework", "source", "archive"];
const LICENSES: &[&str] = &["MIT", "Apache-2.0", "BSD-3-Clause", "ISC"];

fn package_id(i: usize) -> String {
    format!("https://bench.example/sbom/package/{i:06}")
}

/// Deterministic 64 hex digit digest for package `i`.
fn digest(i: usize) -> String {
    let mut state = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0xD1B5_4A32_D192_ED03;
    let mut out = String::with_capacity(64);
    for _ in 0..4 {
        state ^= state >> 33;
        state = state.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
        out.push_str(&format!("{state:016x}"));
    }
    out
}

fn build_sbom(store: &InMemoryStore, packages: usize) -> TypedNode {
    let author = NodeBuilder::new("https://bench.example/agent/builder", TypeName::core("Tool"), SPEC_VERSION)
        .set(vocab::core("name"), "bench-sbom")
        .build(store)
        .expect("Failed to create tool");
    let info = NodeBuilder::anonymous(store, TypeName::core("CreationInfo"), SPEC_VERSION)
        .set(vocab::core("specVersion"), SPEC_VERSION)
        .set(vocab::core("created"), "2024-07-22T16:01:15Z")
        .add(vocab::core("createdBy"), &author)
        .build(store)
        .expect("Failed to create creation info");

    let licenses: Vec<TypedNode> = LICENSES
        .iter()
        .map(|id| {
            NodeBuilder::new(
                format!("{}{}", vocab::LISTED_LICENSE_NAMESPACE, id),
                TypeName::new("ExpandedLicensing", "ListedLicense"),
                SPEC_VERSION,
            )
            .set(vocab::core("creationInfo"), &info)
            .build(store)
            .expect("Failed to create license")
        })
        .collect();

    let mut elements = vec![author.clone()];
    elements.extend(licenses.iter().cloned());
    let mut roots = Vec::new();
    for i in 0..packages {
        let hash = NodeBuilder::anonymous(store, TypeName::core("Hash"), SPEC_VERSION)
            .set_uri(vocab::core("algorithm"), format!("{TERMS}/Core/HashAlgorithm/sha256"))
            .set(vocab::core("hashValue"), digest(i))
            .build(store)
            .expect("Failed to create hash");
        let package = NodeBuilder::new(package_id(i), TypeName::new("Software", "SpdxPackage"), SPEC_VERSION)
            .set(vocab::core("creationInfo"), &info)
            .set(vocab::core("name"), format!("package-{i}"))
            .set(vocab::software("packageVersion"), format!("{}.{}.{}", i % 7, i % 13, i % 31))
            .set_uri(
                vocab::software("primaryPurpose"),
                format!("{TERMS}/Software/SoftwarePurpose/{}", PURPOSES[i % PURPOSES.len()]),
            )
            .add(vocab::core("verifiedUsing"), &hash)
            .build(store)
            .expect("Failed to create package");

        let depends = NodeBuilder::new(
            format!("{}/depends", package.id),
            TypeName::core("Relationship"),
            SPEC_VERSION,
        )
        .set(vocab::core("creationInfo"), &info)
        .set(vocab::core("from"), &package)
        .add(
            vocab::core("to"),
            Value::Node(TypedNode::new(
                package_id((i + 1) % packages),
                TypeName::new("Software", "SpdxPackage"),
                SPEC_VERSION,
            )),
        )
        .set_uri(vocab::core("relationshipType"), format!("{TERMS}/Core/RelationshipType/dependsOn"))
        .build(store)
        .expect("Failed to create relationship");

        let license = NodeBuilder::new(
            format!("{}/license", package.id),
            TypeName::core("Relationship"),
            SPEC_VERSION,
        )
        .set(vocab::core("creationInfo"), &info)
        .set(vocab::core("from"), &package)
        .add(vocab::core("to"), &licenses[i % licenses.len()])
        .set_uri(vocab::core("relationshipType"), format!("{TERMS}/Core/RelationshipType/hasConcludedLicense"))
        .build(store)
        .expect("Failed to create relationship");

        roots.push(package.clone());
        elements.extend([package, depends, license]);
    }

    NodeBuilder::new("https://bench.example/sbom", TypeName::core("SpdxDocument"), SPEC_VERSION)
        .set(vocab::core("creationInfo"), &info)
        .add_all(vocab::core("rootElement"), roots)
        .add_all(vocab::core("element"), elements)
        .build(store)
        .expect("Failed to create document")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let packages: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse().expect("Package count must be a number"))
        .unwrap_or(5_000);

    let cache = Arc::new(SchemaCache::bundled());

    let build_start = Instant::now();
    let store = Arc::new(InMemoryStore::new());
    let document = build_sbom(&store, packages);
    let build_time = build_start.elapsed();
    info!(packages, nodes = store.len(), "built synthetic sbom");
    println!("Built {} packages ({} nodes) in {:?}", packages, store.len(), build_time);

    // Benchmark serialization (pretty)
    let serializer =
        GraphSerializer::new(store.as_ref(), &cache, SerializeOptions::default()).expect("Failed to load schema");
    let serialize_start = Instant::now();
    let graph = serializer.serialize(Some(&document)).expect("Failed to serialize");
    let serialize_time = serialize_start.elapsed();
    let encoded = serde_json::to_vec_pretty(&graph).expect("Failed to write JSON");

    println!(
        "\nSerialize (pretty): {} entries, {} bytes in {:?}",
        graph["@graph"].as_array().map_or(0, Vec::len),
        encoded.len(),
        serialize_time
    );
    println!(
        "  Throughput: {:.2} MB/s",
        (encoded.len() as f64 / 1_000_000.0) / serialize_time.as_secs_f64()
    );

    // Benchmark serialization (compact)
    let compact_serializer =
        GraphSerializer::new(store.as_ref(), &cache, SerializeOptions::compact()).expect("Failed to load schema");
    let compact_start = Instant::now();
    let compact = compact_serializer.serialize(Some(&document)).expect("Failed to serialize");
    let compact_time = compact_start.elapsed();
    let compact_encoded = serde_json::to_vec(&compact).expect("Failed to write JSON");

    println!(
        "\nSerialize (compact): {} bytes in {:?}",
        compact_encoded.len(),
        compact_time
    );

    // Verify serialization is deterministic
    let again = serde_json::to_vec_pretty(&serializer.serialize(Some(&document)).expect("Failed to serialize"))
        .expect("Failed to write JSON");
    assert_eq!(encoded, again, "Serialization should be deterministic");

    // Benchmark deserialization into a fresh store
    const DECODE_ITERS: u32 = 3;

    let catalog = Arc::new(LicenseCatalog::new());
    for id in LICENSES {
        catalog.add_license(id, id, "").expect("Failed to add license");
    }

    let deserialize_start = Instant::now();
    let mut reread = None;
    for _ in 0..DECODE_ITERS {
        let target = JsonLdStore::new(InMemoryStore::new(), cache.clone()).with_license_repository(catalog.clone());
        let rebuilt = target.deserialize(encoded.as_slice(), false).expect("Failed to deserialize");
        reread = Some((target, rebuilt));
    }
    let deserialize_time = deserialize_start.elapsed() / DECODE_ITERS;
    let (target, rebuilt) = reread.expect("At least one iteration");

    println!(
        "\nDeserialize: {:?} (avg of {} iterations)",
        deserialize_time, DECODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        (encoded.len() as f64 / 1_000_000.0) / deserialize_time.as_secs_f64()
    );

    let members = target
        .list_values(&rebuilt.id, &vocab::core("element"))
        .expect("Failed to read elements")
        .len();
    let source_members = store
        .list_values(&document.id, &vocab::core("element"))
        .expect("Failed to read elements")
        .len();
    assert_eq!(members, source_members, "Element count should survive a round trip");

    // Re-serializing the rebuilt document must give the same bytes
    let round_trip = serde_json::to_vec_pretty(&target.to_json(Some(&rebuilt)).expect("Failed to serialize"))
        .expect("Failed to write JSON");
    assert_eq!(encoded, round_trip, "Round trip should be byte identical");

    println!("\n=== Checks ===");
    println!("Deterministic: yes");
    println!("Round trip: {} elements, byte identical", members);
}
