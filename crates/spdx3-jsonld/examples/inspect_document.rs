//! Simple reader to inspect SPDX 3 JSON-LD files.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use spdx3_jsonld::{vocab, InMemoryStore, JsonLdStore, ModelStore, SchemaCache, TypedNode, Value};

fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::Integer(i) => format!("{}", i),
        Value::Double(d) => format!("{:.6}", d),
        Value::Bool(b) => format!("{}", b),
        Value::Uri(uri) => format!("ENUM({})", uri.rsplit('/').next().unwrap_or(uri)),
        Value::External(uri) => format!("EXTERNAL({})", uri),
        Value::Node(node) => format!("{}({})", node.type_name, node.id),
    }
}

fn print_node(store: &impl ModelStore, node: &TypedNode) {
    let properties = store.property_descriptors(&node.id).expect("Failed to list properties");
    for property in properties.iter().take(8) {
        let name = property.wire_name();
        if store.is_collection_property(&node.id, property).unwrap_or(false) {
            let values = store.list_values(&node.id, property).expect("Failed to list values");
            let shown: Vec<_> = values.iter().take(3).map(format_value).collect();
            let more = if values.len() > 3 {
                format!(" ... and {} more", values.len() - 3)
            } else {
                String::new()
            };
            println!("      {} = [{}]{}", name, shown.join(", "), more);
        } else if let Some(value) = store.get_value(&node.id, property).expect("Failed to read value") {
            println!("      {} = {}", name, format_value(&value));
        }
    }
    if properties.len() > 8 {
        println!("      ... and {} more properties", properties.len() - 8);
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/package_sbom.json".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let cache = Arc::new(SchemaCache::bundled());
    let schema = cache.get_or_create(cache.latest_version()).expect("Failed to load schema");
    let valid = schema.validate_reader(data.as_slice()).expect("Failed to read file");
    println!("Schema {}: {}", schema.spec_version(), if valid { "valid" } else { "INVALID" });

    let store = JsonLdStore::new(InMemoryStore::new(), cache.clone());
    let document = store.deserialize(data.as_slice(), false).expect("Failed to deserialize");

    for fallback in cache.fallbacks() {
        println!(
            "Spec version {} not available, read as {} ({})",
            fallback.requested, fallback.resolved, fallback.reason
        );
    }

    println!("\n=== Document ===");
    println!("ID: {}", document.id);
    let roots = store
        .list_values(&document.id, &vocab::core("rootElement"))
        .expect("Failed to read root elements");
    println!("Root elements: {}", roots.len());
    for root in &roots {
        println!("  - {}", format_value(root));
    }
    let imports = store
        .list_values(&document.id, &vocab::core("import"))
        .expect("Failed to read imports");
    println!("Imports: {}", imports.len());
    for import in &imports {
        if let Some(map) = import.as_node() {
            if let Ok(Some(id)) = store.get_value(&map.id, &vocab::core("externalSpdxId")) {
                println!("  - {}", format_value(&id));
            }
        }
    }

    let elements: Vec<TypedNode> = store
        .list_values(&document.id, &vocab::core("element"))
        .expect("Failed to read elements")
        .into_iter()
        .filter_map(|v| v.as_node().cloned())
        .collect();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for element in &elements {
        *counts.entry(element.type_name.to_wire()).or_default() += 1;
    }
    println!("\n=== Elements ({}) ===", elements.len());
    for (type_name, count) in &counts {
        println!("  {}: {}", type_name, count);
    }

    // Show first few elements in detail
    println!("\n=== First 20 Elements (detail) ===");
    for (i, element) in elements.iter().take(20).enumerate() {
        println!("[{}] {} {}", i, element.type_name, element.id);
        print_node(&store, element);
    }
}
