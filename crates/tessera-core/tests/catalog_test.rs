//! Integration tests for catalog loading and lookup.

use std::io::Write;
use std::sync::Arc;

use tessera_core::fixtures::banking_catalog;
use tessera_core::{
    CatalogData, CatalogIndex, CatalogManager, CatalogSource, ConstraintRegistry, Event,
    SharedCatalogManager, DEFAULT_CATALOG,
};

const CATALOG_JSON: &str = r#"{
    // shared attributes
    "attributes": [
        {"name": "userId", "requestContext": true, "required": true},
        {"name": "sku", "dataType": "STRING", "required": true,
         "constraints": [{"constraintType": {"name": "pattern"}, "value": "[A-Z]{3}-[0-9]{4}"}]},
        {"name": "quantity", "dataType": "INT", "required": true, "catalogId": "retail",
         "constraints": [{"constraintType": {"name": "MinValue"}, "value": "1"}]}
    ],
    "events": [
        {"name": "purchase", "catalogId": "retail",
         "attributes": [{"name": "sku"}, {"name": "quantity"}, {"name": "userId"}]},
        {"name": "purchase", "attributes": [{"name": "sku"}]}
    ]
}"#;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_catalog_file_and_build() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CATALOG_JSON.as_bytes()).expect("write catalog");

    let data = CatalogData::from_path(file.path()).expect("catalog parses");
    let index = CatalogIndex::build(data).expect("catalog builds");

    assert_eq!(index.catalog_ids(), vec![DEFAULT_CATALOG, "retail"]);
    assert_eq!(
        index.get_attribute_names("purchase", Some("retail")).unwrap(),
        vec!["sku", "quantity"]
    );
    assert_eq!(index.get_attribute_names("purchase", None).unwrap(), vec!["sku"]);
    assert_eq!(
        index
            .get_required_context_attributes("purchase", Some("retail"))
            .unwrap(),
        vec!["userId"]
    );
}

#[test]
fn test_constraint_names_resolve_case_insensitively_at_build() {
    let data = CatalogData::from_json_str(CATALOG_JSON).unwrap();
    let index = CatalogIndex::builder()
        .registry(Arc::new(ConstraintRegistry::builtin()))
        .build(data);
    assert!(index.is_ok(), "MinValue should resolve to minValue: {index:?}");
}

#[test]
fn test_banking_catalog_round_trips_through_json() {
    let json = banking_catalog().to_json_pretty().unwrap();
    let reparsed = CatalogData::from_json_str(&json).unwrap();
    assert_eq!(reparsed, banking_catalog());
}

// =============================================================================
// Snapshots
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_reload() {
    let shared = SharedCatalogManager::new(CatalogIndex::build(banking_catalog()).unwrap());

    let mut readers = Vec::new();
    for _ in 0..8 {
        let source = shared.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let view = source.current();
                // Either the banking catalog or the replacement, never a mix.
                match view.get_event("transfer", None) {
                    Some(_) => {
                        assert_eq!(view.get_attribute_names("transfer", None).unwrap().len(), 3);
                        assert!(view.get_event("audit", None).is_none());
                    }
                    None => assert!(view.get_event("audit", None).is_some()),
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    for round in 0..20 {
        let data = if round % 2 == 0 {
            CatalogData::new().with_event(Event::new("audit"))
        } else {
            banking_catalog()
        };
        shared.reload(data).unwrap();
        tokio::task::yield_now().await;
    }

    for reader in readers {
        reader.await.unwrap();
    }
}
