#![allow(dead_code)]

use async_trait::async_trait;
use docgate_core::{
    DocumentStore, PartitionKey, PartitionKeyPath, ResourceKind, StoreError, StoreItem,
    StoreResult,
};
use docgate_mcp::Arguments;
use serde_json::Value;
use std::sync::Mutex;

/// Store stub with canned answers that records every call it receives
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<String>>,
    databases: Vec<String>,
    containers: Vec<String>,
    query_results: Vec<Value>,
    items: Mutex<Vec<StoreItem>>,
    failure: Option<StoreError>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_databases(mut self, names: &[&str]) -> Self {
        self.databases = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_containers(mut self, names: &[&str]) -> Self {
        self.containers = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_query_results(mut self, results: Vec<Value>) -> Self {
        self.query_results = results;
        self
    }

    pub fn with_item(self, item: Value) -> Self {
        if let Value::Object(map) = item {
            self.items.lock().unwrap().push(map);
        }
        self
    }

    /// Every call fails with this error
    pub fn failing_with(mut self, err: StoreError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<StoreItem> {
        self.items.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn id_of(item: &StoreItem) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        self.record("list_databases")?;
        Ok(self.databases.clone())
    }

    async fn create_database(&self, _name: &str) -> StoreResult<()> {
        self.record("create_database")
    }

    async fn list_containers(&self, database: &str) -> StoreResult<Vec<String>> {
        self.record("list_containers")?;
        if !self.databases.iter().any(|d| d == database) {
            return Err(StoreError::not_found(ResourceKind::Database, database));
        }
        Ok(self.containers.clone())
    }

    async fn create_container(&self, _: &str, _: &str, _: &PartitionKeyPath) -> StoreResult<()> {
        self.record("create_container")
    }

    async fn query_items(&self, _: &str, _: &str, _: &str) -> StoreResult<Vec<Value>> {
        self.record("query_items")?;
        Ok(self.query_results.clone())
    }

    async fn read_all_items(&self, _: &str, _: &str) -> StoreResult<Vec<StoreItem>> {
        self.record("read_all_items")?;
        Ok(self.items())
    }

    async fn read_item(&self, _: &str, _: &str, id: &str, _: &PartitionKey) -> StoreResult<StoreItem> {
        self.record("read_item")?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| id_of(item) == Some(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(ResourceKind::Item, id))
    }

    async fn delete_item(&self, _: &str, _: &str, id: &str, _: &PartitionKey) -> StoreResult<()> {
        self.record("delete_item")?;
        let mut items = self.items.lock().unwrap();
        let index = items
            .iter()
            .position(|item| id_of(item) == Some(id))
            .ok_or_else(|| StoreError::not_found(ResourceKind::Item, id))?;
        items.remove(index);
        Ok(())
    }

    async fn upsert_item(&self, _: &str, _: &str, item: StoreItem) -> StoreResult<StoreItem> {
        self.record("upsert_item")?;
        let mut items = self.items.lock().unwrap();
        let id = id_of(&item).map(str::to_string);
        match items.iter().position(|existing| id_of(existing).map(str::to_string) == id) {
            Some(index) => items[index] = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(item)
    }

    async fn create_item(&self, _: &str, _: &str, item: StoreItem) -> StoreResult<StoreItem> {
        self.record("create_item")?;
        self.items.lock().unwrap().push(item.clone());
        Ok(item)
    }
}

pub fn args(pairs: &[(&str, &str)]) -> Arguments {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
