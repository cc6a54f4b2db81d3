//! End to end tests: JSON-LD documents through a store and back.

use std::sync::Arc;

use serde_json::{json, Value as Json};
use spdx3_jsonld::{
    vocab, GraphDeserializer, GraphSerializer, InMemoryStore, ModelStore, NodeBuilder, SchemaCache,
    SerializeOptions, TypeName, TypedNode, Value,
};

const PACKAGE_SBOM: &str = include_str!("fixtures/package_sbom.json");

const PERSON: &str = "http://spdx.example.com/Agent/JoshuaWatt";
const PACKAGE: &str = "http://spdx.example.com/Package1";

fn load(store: Arc<InMemoryStore>, cache: Arc<SchemaCache>, document: &Json) -> Vec<TypedNode> {
    let deserializer = GraphDeserializer::new(store, cache.clone());
    deserializer
        .deserialize_graph(&document["@graph"], cache.latest_version())
        .unwrap()
}

fn serialize_all(store: &InMemoryStore, cache: &SchemaCache) -> Json {
    GraphSerializer::new(store, cache, SerializeOptions::default())
        .unwrap()
        .serialize(None)
        .unwrap()
}

fn entries(document: &Json) -> &Vec<Json> {
    document["@graph"].as_array().unwrap()
}

fn entry<'a>(document: &'a Json, spdx_id: &str) -> &'a Json {
    entries(document)
        .iter()
        .find(|e| e["spdxId"] == spdx_id)
        .unwrap_or_else(|| panic!("no entry {spdx_id}"))
}

#[test]
fn test_person_and_package_scenario() {
    let store = Arc::new(InMemoryStore::new());
    let cache = Arc::new(SchemaCache::bundled());
    let input: Json = serde_json::from_str(PACKAGE_SBOM).unwrap();

    let created = load(store.clone(), cache.clone(), &input);
    let ids: Vec<_> = created.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec![PERSON, PACKAGE]);
    // Spec version comes from the creation info, not the latest schema.
    assert!(created.iter().all(|n| n.spec_version == "3.0.0"));
    assert_eq!(cache.fallbacks().len(), 1);
    assert_eq!(cache.fallbacks()[0].requested, "3.0.0");

    let output = serialize_all(&store, &cache);
    let graph = entries(&output);
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.iter().filter(|e| e.get("spdxId").is_some()).count(), 2);

    let info = graph.iter().find(|e| e["type"] == "CreationInfo").unwrap();
    assert_eq!(info["@id"], "_:creationInfo_0");
    assert_eq!(info["created"], "2024-07-22T16:01:15Z");
    assert_eq!(info["specVersion"], "3.0.0");
    assert_eq!(info["createdBy"], json!([PERSON]));

    let package = entry(&output, PACKAGE);
    assert_eq!(package["type"], "software_Package");
    assert_eq!(package["name"], "Package Name");
    assert_eq!(package["creationInfo"], "_:creationInfo_0");
    assert_eq!(package["software_primaryPurpose"], "application");
    assert_eq!(
        package["verifiedUsing"],
        json!([{
            "type": "Hash",
            "algorithm": "sha256",
            "hashValue": "d301fcd0b1a2ea6b8c9b3d66e9fd1e37a3e3b8f5cd2a4c9e1f0b5d1e8c7a47b8"
        }])
    );

    let person = entry(&output, PERSON);
    assert_eq!(
        person["externalIdentifier"],
        json!([{"type": "ExternalIdentifier", "externalIdentifierType": "email", "identifier": "JPEWhacker@gmail.com"}])
    );
}

#[test]
fn test_round_trip_is_stable() {
    let cache = Arc::new(SchemaCache::bundled());
    let input: Json = serde_json::from_str(PACKAGE_SBOM).unwrap();

    let first_store = Arc::new(InMemoryStore::new());
    load(first_store.clone(), cache.clone(), &input);
    let first = serialize_all(&first_store, &cache);

    let second_store = Arc::new(InMemoryStore::new());
    load(second_store.clone(), cache.clone(), &first);
    let second = serialize_all(&second_store, &cache);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    // Same ids, types and values on both sides.
    for id in [PERSON, PACKAGE] {
        let a = first_store.typed_node(id).unwrap();
        let b = second_store.typed_node(id).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            first_store.get_value(id, &vocab::core("name")).unwrap(),
            second_store.get_value(id, &vocab::core("name")).unwrap()
        );
    }
    assert_eq!(
        second_store
            .get_value(PACKAGE, &vocab::software("primaryPurpose"))
            .unwrap(),
        Some(Value::Uri(
            "https://spdx.org/rdf/3.0.1/terms/Software/SoftwarePurpose/application".into()
        ))
    );
}

#[test]
fn test_external_reference_is_written_as_id() {
    let store = InMemoryStore::new();
    let cache = SchemaCache::bundled();
    let package = NodeBuilder::new("https://example.com/package", TypeName::new("Software", "SpdxPackage"), "3.0.1")
        .set(vocab::core("name"), "app")
        .build(&store)
        .unwrap();
    let dependency = NodeBuilder::new("https://example.com/dependency", TypeName::new("Software", "SpdxPackage"), "3.0.1")
        .set(vocab::core("name"), "lib")
        .build(&store)
        .unwrap();
    let contains = NodeBuilder::new("https://example.com/contains", TypeName::core("Relationship"), "3.0.1")
        .set(vocab::core("from"), &package)
        .add(vocab::core("to"), &dependency)
        .add(vocab::core("to"), Value::External("https://other.example/sbom#zlib".into()))
        .set_uri(
            vocab::core("relationshipType"),
            "https://spdx.org/rdf/3.0.1/terms/Core/RelationshipType/contains",
        )
        .build(&store)
        .unwrap();
    let document = NodeBuilder::new("https://example.com/doc", TypeName::core("SpdxDocument"), "3.0.1")
        .add(vocab::core("rootElement"), &package)
        .add(vocab::core("element"), &contains)
        .build(&store)
        .unwrap();

    let output = GraphSerializer::new(&store, &cache, SerializeOptions::default())
        .unwrap()
        .serialize(Some(&document))
        .unwrap();
    let relationship = entry(&output, &contains.id);
    assert_eq!(relationship["relationshipType"], "contains");
    assert_eq!(
        relationship["to"],
        json!(["https://example.com/dependency", "https://other.example/sbom#zlib"])
    );
    assert!(!entries(&output).iter().any(|e| e["spdxId"] == "https://example.com/dependency"));
    assert!(!entries(&output).iter().any(|e| e["spdxId"] == "https://other.example/sbom#zlib"));
}

#[test]
fn test_output_independent_of_insertion_order() {
    let cache = SchemaCache::bundled();
    let build = |reverse: bool| {
        let store = InMemoryStore::new();
        let mut names: Vec<_> = (0..20).map(|i| format!("https://example.com/agent/{i:02}")).collect();
        if reverse {
            names.reverse();
        }
        for id in &names {
            let hash = NodeBuilder::anonymous(&store, TypeName::core("Hash"), "3.0.1")
                .set_uri(
                    vocab::core("algorithm"),
                    "https://spdx.org/rdf/3.0.1/terms/Core/HashAlgorithm/sha1",
                )
                .set(vocab::core("hashValue"), id.clone())
                .build(&store)
                .unwrap();
            NodeBuilder::new(id.clone(), TypeName::core("Organization"), "3.0.1")
                .set(vocab::core("name"), id.clone())
                .add(vocab::core("verifiedUsing"), &hash)
                .build(&store)
                .unwrap();
        }
        let output = serialize_all(&store, &cache);
        serde_json::to_vec(&output).unwrap()
    };
    assert_eq!(build(false), build(true));
}
