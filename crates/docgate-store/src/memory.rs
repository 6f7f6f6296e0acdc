use async_trait::async_trait;
use docgate_core::store::ensure_same_id;
use docgate_core::{
    item_id, stamp_system_properties, DocumentStore, PartitionKey, PartitionKeyPath, Query,
    ResourceKind, StoreError, StoreItem, StoreResult,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryContainer {
    partition_key_path: PartitionKeyPath,
    /// Items in insertion order, tagged with their resolved partition key
    items: Vec<(PartitionKey, StoreItem)>,
}

impl MemoryContainer {
    fn position(&self, id: &str, partition_key: &PartitionKey) -> Option<usize> {
        self.items.iter().position(|(pk, item)| {
            pk == partition_key && item.get("id").and_then(JsonValue::as_str) == Some(id)
        })
    }
}

type Databases = BTreeMap<String, BTreeMap<String, MemoryContainer>>;

/// In-memory implementation of DocumentStore for tests and local runs
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    data: Arc<RwLock<Databases>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self { data: Arc::new(RwLock::new(BTreeMap::new())) }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn container<'a>(
    data: &'a Databases,
    database: &str,
    container: &str,
) -> StoreResult<&'a MemoryContainer> {
    data.get(database)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Database, database))?
        .get(container)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Container, container))
}

fn container_mut<'a>(
    data: &'a mut Databases,
    database: &str,
    container: &str,
) -> StoreResult<&'a mut MemoryContainer> {
    data.get_mut(database)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Database, database))?
        .get_mut(container)
        .ok_or_else(|| StoreError::not_found(ResourceKind::Container, container))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data.keys().cloned().collect())
    }

    async fn create_database(&self, name: &str) -> StoreResult<()> {
        let mut data = self.data.write().await;
        data.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn list_containers(&self, database: &str) -> StoreResult<Vec<String>> {
        let data = self.data.read().await;
        let containers = data
            .get(database)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Database, database))?;
        Ok(containers.keys().cloned().collect())
    }

    async fn create_container(
        &self,
        database: &str,
        name: &str,
        partition_key_path: &PartitionKeyPath,
    ) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let containers = data
            .get_mut(database)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Database, database))?;
        containers.entry(name.to_string()).or_insert_with(|| MemoryContainer {
            partition_key_path: partition_key_path.clone(),
            items: Vec::new(),
        });
        Ok(())
    }

    async fn query_items(
        &self,
        database: &str,
        container_name: &str,
        sql: &str,
    ) -> StoreResult<Vec<JsonValue>> {
        let data = self.data.read().await;
        let container = container(&data, database, container_name)?;
        let query = Query::parse(sql)?;
        Ok(query.execute(container.items.iter().map(|(_, item)| item)))
    }

    async fn read_all_items(&self, database: &str, container_name: &str) -> StoreResult<Vec<StoreItem>> {
        let data = self.data.read().await;
        let container = container(&data, database, container_name)?;
        Ok(container.items.iter().map(|(_, item)| item.clone()).collect())
    }

    async fn read_item(
        &self,
        database: &str,
        container_name: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<StoreItem> {
        let data = self.data.read().await;
        let container = container(&data, database, container_name)?;
        container
            .position(id, partition_key)
            .map(|index| container.items[index].1.clone())
            .ok_or_else(|| StoreError::not_found(ResourceKind::Item, id))
    }

    async fn delete_item(
        &self,
        database: &str,
        container_name: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let container = container_mut(&mut data, database, container_name)?;
        let index = container
            .position(id, partition_key)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Item, id))?;
        container.items.remove(index);
        Ok(())
    }

    async fn upsert_item(
        &self,
        database: &str,
        container_name: &str,
        mut item: StoreItem,
    ) -> StoreResult<StoreItem> {
        let mut data = self.data.write().await;
        let container = container_mut(&mut data, database, container_name)?;
        let id = item_id(&item)?.to_string();
        let partition_key = container.partition_key_path.partition_key_of(&item);
        stamp_system_properties(&mut item);

        match container.position(&id, &partition_key) {
            Some(index) => container.items[index] = (partition_key, item.clone()),
            None => container.items.push((partition_key, item.clone())),
        }
        Ok(item)
    }

    async fn create_item(
        &self,
        database: &str,
        container_name: &str,
        mut item: StoreItem,
    ) -> StoreResult<StoreItem> {
        let mut data = self.data.write().await;
        let container = container_mut(&mut data, database, container_name)?;
        let id = item_id(&item)?.to_string();
        let partition_key = container.partition_key_path.partition_key_of(&item);
        if container.position(&id, &partition_key).is_some() {
            return Err(StoreError::Conflict(format!(
                "Item '{}' already exists in partition '{}'",
                id, partition_key
            )));
        }
        stamp_system_properties(&mut item);
        container.items.push((partition_key, item.clone()));
        Ok(item)
    }

    /// Delete and re-insert under one write lock, so readers never observe the gap
    async fn rekey_item(
        &self,
        database: &str,
        container_name: &str,
        id: &str,
        old_partition_key: &PartitionKey,
        mut new_item: StoreItem,
    ) -> StoreResult<StoreItem> {
        ensure_same_id(id, &new_item)?;
        let mut data = self.data.write().await;
        let container = container_mut(&mut data, database, container_name)?;
        let index = container
            .position(id, old_partition_key)
            .ok_or_else(|| StoreError::not_found(ResourceKind::Item, id))?;

        let new_partition_key = container.partition_key_path.partition_key_of(&new_item);
        if &new_partition_key != old_partition_key
            && container.position(id, &new_partition_key).is_some()
        {
            return Err(StoreError::Conflict(format!(
                "Item '{}' already exists in partition '{}'",
                id, new_partition_key
            )));
        }

        stamp_system_properties(&mut new_item);
        if &new_partition_key == old_partition_key {
            container.items[index] = (new_partition_key, new_item.clone());
        } else {
            container.items.remove(index);
            container.items.push((new_partition_key, new_item.clone()));
        }
        Ok(new_item)
    }
}
