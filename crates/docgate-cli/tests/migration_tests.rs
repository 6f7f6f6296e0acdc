use docgate_cli::commands::{MigrateCategoriesCommand, SeedCommand};
use docgate_core::{DocumentStore, PartitionKey, StoreError};
use docgate_store::{MemoryDocumentStore, SqlDocumentStore};
use tempfile::tempdir;

async fn migrate_and_check(store: &dyn DocumentStore) {
    SeedCommand::run(store, "SampleDB", "Products").await.unwrap();

    let changes = MigrateCategoriesCommand::run(store, "SampleDB", "Products", false).await.unwrap();
    assert_eq!(changes.len(), 10);
    let chair = changes.iter().find(|c| c.id == "4").unwrap();
    assert_eq!((chair.from.as_str(), chair.to.as_str()), ("Furniture", "furniture"));

    // every item now lives under its lowercase partition
    let items = store.read_all_items("SampleDB", "Products").await.unwrap();
    assert_eq!(items.len(), 10);
    for item in &items {
        let category = item["category"].as_str().unwrap();
        assert_eq!(category, category.to_lowercase());
    }

    let notebooks = store
        .read_item("SampleDB", "Products", "10", &PartitionKey::new("office supplies"))
        .await
        .unwrap();
    assert_eq!(notebooks["name"], "Notebook Set");

    let old = store
        .read_item("SampleDB", "Products", "10", &PartitionKey::new("Office Supplies"))
        .await;
    assert!(matches!(old, Err(StoreError::NotFound { .. })));

    let electronics = store
        .query_items("SampleDB", "Products", "SELECT * FROM c WHERE c.category = 'electronics'")
        .await
        .unwrap();
    assert_eq!(electronics.len(), 5);

    // a second run has nothing left to do
    let changes = MigrateCategoriesCommand::run(store, "SampleDB", "Products", false).await.unwrap();
    assert!(changes.is_empty());
}

#[tokio::test]
async fn migrates_memory_store() {
    let store = MemoryDocumentStore::new();
    migrate_and_check(&store).await;
}

#[tokio::test]
async fn migrates_sqlite_store() {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("docgate.db").display());
    let store = SqlDocumentStore::new(&url).await.unwrap();
    migrate_and_check(&store).await;
}

#[tokio::test]
async fn migration_stops_on_partition_conflict() {
    let store = MemoryDocumentStore::new();
    SeedCommand::run(&store, "SampleDB", "Products").await.unwrap();

    // an item with the same id already sits in the target partition
    let mut clash = store
        .read_item("SampleDB", "Products", "8", &PartitionKey::new("Lighting"))
        .await
        .unwrap();
    clash.insert("category".to_string(), serde_json::json!("lighting"));
    store.create_item("SampleDB", "Products", clash).await.unwrap();

    let result = MigrateCategoriesCommand::run(&store, "SampleDB", "Products", false).await;
    assert!(result.is_err());

    // the conflicting item was not lost
    let original = store
        .read_item("SampleDB", "Products", "8", &PartitionKey::new("Lighting"))
        .await
        .unwrap();
    assert_eq!(original["name"], "Desk Lamp");
}
