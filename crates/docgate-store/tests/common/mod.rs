use docgate_core::{DocumentStore, PartitionKey, PartitionKeyPath, ResourceKind, StoreError, StoreItem};
use serde_json::{json, Value as JsonValue};

pub fn item(value: JsonValue) -> StoreItem {
    value.as_object().cloned().expect("test item must be an object")
}

pub async fn seed(store: &dyn DocumentStore) {
    store.create_database("SampleDB").await.expect("create database");
    store
        .create_container("SampleDB", "Products", &PartitionKeyPath::new("/category").unwrap())
        .await
        .expect("create container");

    for value in [
        json!({"id": "1", "name": "Laptop Pro 15", "category": "Electronics", "price": 1299.99}),
        json!({"id": "2", "name": "Wireless Mouse", "category": "Electronics", "price": 29.99}),
        json!({"id": "4", "name": "Office Chair", "category": "Furniture", "price": 299.99}),
        json!({"id": "10", "name": "Notebook Set", "category": "Office Supplies", "price": 15.99}),
    ] {
        store.upsert_item("SampleDB", "Products", item(value)).await.expect("seed item");
    }
}

pub async fn lists_resources(store: &dyn DocumentStore) {
    seed(store).await;
    store.create_database("Archive").await.unwrap();
    // creating twice is a no-op
    store.create_database("Archive").await.unwrap();

    assert_eq!(store.list_databases().await.unwrap(), vec!["Archive", "SampleDB"]);
    assert_eq!(store.list_containers("SampleDB").await.unwrap(), vec!["Products"]);
    assert!(store.list_containers("Archive").await.unwrap().is_empty());

    let err = store.list_containers("Missing").await.unwrap_err();
    assert_eq!(err, StoreError::not_found(ResourceKind::Database, "Missing"));
}

pub async fn point_operations(store: &dyn DocumentStore) {
    seed(store).await;

    let found = store
        .read_item("SampleDB", "Products", "4", &PartitionKey::new("Furniture"))
        .await
        .unwrap();
    assert_eq!(found["name"], "Office Chair");
    assert!(found.contains_key("_ts"));

    // wrong partition key is a miss
    let err = store
        .read_item("SampleDB", "Products", "4", &PartitionKey::new("Electronics"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Item '4' not found");

    store
        .delete_item("SampleDB", "Products", "4", &PartitionKey::new("Furniture"))
        .await
        .unwrap();
    let err = store
        .delete_item("SampleDB", "Products", "4", &PartitionKey::new("Furniture"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .read_item("SampleDB", "Nope", "4", &PartitionKey::new("Furniture"))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::not_found(ResourceKind::Container, "Nope"));
}

pub async fn upsert_and_create(store: &dyn DocumentStore) {
    seed(store).await;

    let updated = store
        .upsert_item(
            "SampleDB",
            "Products",
            item(json!({"id": "2", "name": "Wireless Mouse", "category": "Electronics", "price": 24.99})),
        )
        .await
        .unwrap();
    assert_eq!(updated["price"], 24.99);

    let all = store.read_all_items("SampleDB", "Products").await.unwrap();
    let ids: Vec<&str> = all.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "4", "10"]);
    assert_eq!(all[1]["price"], 24.99);

    let err = store
        .create_item("SampleDB", "Products", item(json!({"id": "1", "category": "Electronics"})))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");

    let err = store
        .upsert_item("SampleDB", "Products", item(json!({"name": "no id"})))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::BadRequest(_)));
}

pub async fn queries(store: &dyn DocumentStore) {
    seed(store).await;

    let results = store
        .query_items("SampleDB", "Products", "SELECT * FROM c WHERE c.category = 'Electronics'")
        .await
        .unwrap();
    assert_eq!(results.len(), 2);

    let results = store
        .query_items("SampleDB", "Products", "SELECT VALUE c.name FROM c WHERE c.price < 100")
        .await
        .unwrap();
    assert_eq!(results, vec![json!("Wireless Mouse"), json!("Notebook Set")]);

    let err = store
        .query_items("SampleDB", "Products", "SELECT * FROM")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Query(_)));
    assert!(err.to_string().starts_with("Query error: "));

    let err = store
        .query_items("Missing", "Products", "SELECT * FROM c")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Database 'Missing' not found");
}

pub async fn rekey(store: &dyn DocumentStore) {
    seed(store).await;

    let moved = store
        .rekey_item(
            "SampleDB",
            "Products",
            "10",
            &PartitionKey::new("Office Supplies"),
            item(json!({"id": "10", "name": "Notebook Set", "category": "office supplies", "price": 15.99})),
        )
        .await
        .unwrap();
    assert_eq!(moved["category"], "office supplies");

    assert!(store
        .read_item("SampleDB", "Products", "10", &PartitionKey::new("Office Supplies"))
        .await
        .unwrap_err()
        .is_not_found());
    store
        .read_item("SampleDB", "Products", "10", &PartitionKey::new("office supplies"))
        .await
        .unwrap();

    // a rekey that stays in its partition keeps the item's place in scan order
    let renamed = store
        .rekey_item(
            "SampleDB",
            "Products",
            "1",
            &PartitionKey::new("Electronics"),
            item(json!({"id": "1", "name": "Laptop Pro 16", "category": "Electronics", "price": 1399.99})),
        )
        .await
        .unwrap();
    assert_eq!(renamed["name"], "Laptop Pro 16");
    let ids = store
        .query_items("SampleDB", "Products", "SELECT VALUE c.id FROM c")
        .await
        .unwrap();
    assert_eq!(ids, vec![json!("1"), json!("2"), json!("4"), json!("10")]);

    // a clash in the target partition keeps the source item in place
    store
        .upsert_item("SampleDB", "Products", item(json!({"id": "1", "category": "electronics"})))
        .await
        .unwrap();
    let err = store
        .rekey_item(
            "SampleDB",
            "Products",
            "1",
            &PartitionKey::new("Electronics"),
            item(json!({"id": "1", "category": "electronics"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    store
        .read_item("SampleDB", "Products", "1", &PartitionKey::new("Electronics"))
        .await
        .unwrap();

    let err = store
        .rekey_item(
            "SampleDB",
            "Products",
            "2",
            &PartitionKey::new("Electronics"),
            item(json!({"id": "3", "category": "electronics"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::BadRequest(_)));
}
