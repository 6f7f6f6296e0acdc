use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{StoreError, StoreResult};
use crate::types::{item_id, PartitionKey, PartitionKeyPath, StoreItem};

/// Async client contract for a partitioned document store.
///
/// Implementations must be safe to share across concurrent tool invocations.
/// Missing databases, containers and items are reported as
/// [`StoreError::NotFound`]; malformed query text as [`StoreError::Query`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List database names
    async fn list_databases(&self) -> StoreResult<Vec<String>>;

    /// Create a database if it does not exist yet
    async fn create_database(&self, name: &str) -> StoreResult<()>;

    /// List container names in a database
    async fn list_containers(&self, database: &str) -> StoreResult<Vec<String>>;

    /// Create a container if it does not exist yet
    async fn create_container(
        &self,
        database: &str,
        name: &str,
        partition_key_path: &PartitionKeyPath,
    ) -> StoreResult<()>;

    /// Run a query across all partitions of a container and materialize the results
    async fn query_items(
        &self,
        database: &str,
        container: &str,
        sql: &str,
    ) -> StoreResult<Vec<JsonValue>>;

    /// Read every item of a container
    async fn read_all_items(&self, database: &str, container: &str) -> StoreResult<Vec<StoreItem>>;

    /// Point read by id and partition key
    async fn read_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<StoreItem>;

    /// Delete by id and partition key
    async fn delete_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<()>;

    /// Insert, or fully replace the item with the same id in the same partition
    async fn upsert_item(
        &self,
        database: &str,
        container: &str,
        item: StoreItem,
    ) -> StoreResult<StoreItem>;

    /// Insert only; fails with [`StoreError::Conflict`] when the id already exists
    async fn create_item(
        &self,
        database: &str,
        container: &str,
        item: StoreItem,
    ) -> StoreResult<StoreItem>;

    /// Move an item to the partition key carried by `new_item`.
    ///
    /// The default is a delete followed by a create. The pair is not atomic: if
    /// the create fails the item is gone. Stores that can replace both in one
    /// step should override this.
    async fn rekey_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        old_partition_key: &PartitionKey,
        new_item: StoreItem,
    ) -> StoreResult<StoreItem> {
        ensure_same_id(id, &new_item)?;
        self.delete_item(database, container, id, old_partition_key).await?;
        self.create_item(database, container, new_item).await
    }
}

/// Reject a re-key whose replacement document carries a different id
pub fn ensure_same_id(id: &str, new_item: &StoreItem) -> StoreResult<()> {
    let new_id = item_id(new_item)?;
    if new_id != id {
        return Err(StoreError::BadRequest(format!(
            "Re-keyed item id '{}' does not match '{}'",
            new_id, id
        )));
    }
    Ok(())
}
