mod common;

use docgate_store::MemoryDocumentStore;

#[tokio::test]
async fn memory_lists_resources() {
    common::lists_resources(&MemoryDocumentStore::new()).await;
}

#[tokio::test]
async fn memory_point_operations() {
    common::point_operations(&MemoryDocumentStore::new()).await;
}

#[tokio::test]
async fn memory_upsert_and_create() {
    common::upsert_and_create(&MemoryDocumentStore::new()).await;
}

#[tokio::test]
async fn memory_queries() {
    common::queries(&MemoryDocumentStore::new()).await;
}

#[tokio::test]
async fn memory_rekey() {
    common::rekey(&MemoryDocumentStore::new()).await;
}
