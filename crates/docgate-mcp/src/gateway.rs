//! Validates tool invocations and dispatches them to a document store

use docgate_core::{DocumentStore, PartitionKey, StoreError};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::envelope::{Arguments, ToolErrorKind, ToolRequest, ToolResult};
use crate::tools::{
    find_tool, ToolSpec, DELETE_ITEM, GET_ITEM, LIST_CONTAINERS, LIST_DATABASES, QUERY_ITEMS,
    UPSERT_ITEM,
};

/// Stateless dispatcher over an injected store client.
///
/// Every call returns a [`ToolResult`]; store failures never escape as errors.
#[derive(Clone)]
pub struct ToolGateway {
    store: Arc<dyn DocumentStore>,
}

impl ToolGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn handle(&self, request: &ToolRequest) -> ToolResult {
        self.dispatch(&request.tool_name, &request.arguments).await
    }

    pub async fn dispatch(&self, name: &str, arguments: &Arguments) -> ToolResult {
        let Some(spec) = find_tool(name) else {
            warn!(tool = name, "unknown tool");
            return ToolResult::failure(ToolErrorKind::Validation, format!("Unknown tool: {}", name));
        };

        if let Err(missing) = validate(spec, arguments) {
            warn!(tool = spec.name, param = missing, "missing required argument");
            return ToolResult::failure(
                ToolErrorKind::Validation,
                format!("Missing required argument: {}", missing),
            );
        }

        debug!(tool = spec.name, "dispatching");
        let arg = |param: &str| arguments.get(param).map(String::as_str).unwrap_or_default();

        match spec.name {
            LIST_DATABASES => self.list_databases().await,
            LIST_CONTAINERS => self.list_containers(arg("database_name")).await,
            QUERY_ITEMS => {
                self.query_items(arg("database_name"), arg("container_name"), arg("query")).await
            }
            GET_ITEM => {
                self.get_item(
                    arg("database_name"),
                    arg("container_name"),
                    arg("item_id"),
                    arg("partition_key"),
                )
                .await
            }
            DELETE_ITEM => {
                self.delete_item(
                    arg("database_name"),
                    arg("container_name"),
                    arg("item_id"),
                    arg("partition_key"),
                )
                .await
            }
            UPSERT_ITEM => {
                self.upsert_item(arg("database_name"), arg("container_name"), arg("item")).await
            }
            other => ToolResult::failure(ToolErrorKind::Validation, format!("Unknown tool: {}", other)),
        }
    }

    async fn list_databases(&self) -> ToolResult {
        match self.store.list_databases().await {
            Ok(databases) => {
                info!(count = databases.len(), "listed databases");
                payload([("count", json!(databases.len())), ("databases", json!(databases))])
            }
            Err(e) => store_failure(LIST_DATABASES, e, StoreError::to_string),
        }
    }

    async fn list_containers(&self, database: &str) -> ToolResult {
        match self.store.list_containers(database).await {
            Ok(containers) => {
                info!(database, count = containers.len(), "listed containers");
                payload([
                    ("database", json!(database)),
                    ("count", json!(containers.len())),
                    ("containers", json!(containers)),
                ])
            }
            Err(e) => store_failure(LIST_CONTAINERS, e, |_| format!("Database '{}' not found", database)),
        }
    }

    async fn query_items(&self, database: &str, container: &str, query: &str) -> ToolResult {
        match self.store.query_items(database, container, query).await {
            Ok(items) => {
                info!(database, container, count = items.len(), "query executed");
                payload([
                    ("database", json!(database)),
                    ("container", json!(container)),
                    ("query", json!(query)),
                    ("count", json!(items.len())),
                    ("items", Value::Array(items)),
                ])
            }
            Err(e) => store_failure(QUERY_ITEMS, e, |e| format!("Resource not found: {}", e)),
        }
    }

    async fn get_item(
        &self,
        database: &str,
        container: &str,
        item_id: &str,
        partition_key: &str,
    ) -> ToolResult {
        let partition_key = PartitionKey::new(partition_key);
        match self.store.read_item(database, container, item_id, &partition_key).await {
            Ok(item) => {
                info!(database, container, item_id, "item read");
                payload([("item", Value::Object(item))])
            }
            Err(e) => store_failure(GET_ITEM, e, |_| format!("Item '{}' not found", item_id)),
        }
    }

    async fn delete_item(
        &self,
        database: &str,
        container: &str,
        item_id: &str,
        partition_key: &str,
    ) -> ToolResult {
        let partition_key = PartitionKey::new(partition_key);
        match self.store.delete_item(database, container, item_id, &partition_key).await {
            Ok(()) => {
                info!(database, container, item_id, "item deleted");
                payload([("message", json!(format!("Item '{}' deleted successfully", item_id)))])
            }
            Err(e) => store_failure(DELETE_ITEM, e, |_| format!("Item '{}' not found", item_id)),
        }
    }

    async fn upsert_item(&self, database: &str, container: &str, raw_item: &str) -> ToolResult {
        let item = match serde_json::from_str::<Value>(raw_item) {
            Ok(Value::Object(item)) => item,
            Ok(_) => {
                warn!(database, container, "item is not a JSON object");
                return ToolResult::failure(ToolErrorKind::MalformedInput, "Item must be a JSON object");
            }
            Err(e) => {
                warn!(database, container, error = %e, "item is not valid JSON");
                return ToolResult::failure(ToolErrorKind::MalformedInput, "Invalid JSON format for item");
            }
        };

        match self.store.upsert_item(database, container, item).await {
            Ok(stored) => {
                info!(database, container, item_id = ?stored.get("id"), "item upserted");
                payload([
                    ("message", json!("Item upserted successfully (inserted or updated)")),
                    ("item", Value::Object(stored)),
                ])
            }
            Err(e) => store_failure(UPSERT_ITEM, e, StoreError::to_string),
        }
    }
}

impl std::fmt::Debug for ToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGateway").finish_non_exhaustive()
    }
}

/// Name of the first required parameter that is absent or blank, in declared order
fn validate(spec: &ToolSpec, arguments: &Arguments) -> Result<(), &'static str> {
    for param in spec.required_params() {
        let present = arguments.get(param.name).is_some_and(|value| !value.trim().is_empty());
        if !present {
            return Err(param.name);
        }
    }
    Ok(())
}

fn payload<const N: usize>(fields: [(&str, Value); N]) -> ToolResult {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.to_string(), value);
    }
    ToolResult::success(map)
}

fn store_failure<F>(tool: &str, err: StoreError, not_found_message: F) -> ToolResult
where
    F: FnOnce(&StoreError) -> String,
{
    if err.is_not_found() {
        warn!(tool, error = %err, "resource not found");
        ToolResult::failure(ToolErrorKind::NotFound, not_found_message(&err))
    } else {
        error!(tool, error = %err, "store call failed");
        ToolResult::failure(ToolErrorKind::Store, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog;

    fn args(pairs: &[(&str, &str)]) -> Arguments {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn validate_reports_first_missing_in_declared_order() {
        let spec = find_tool(GET_ITEM).unwrap();
        assert_eq!(validate(spec, &args(&[])), Err("database_name"));
        assert_eq!(
            validate(spec, &args(&[("database_name", "db"), ("item_id", "1")])),
            Err("container_name")
        );
        assert_eq!(
            validate(
                spec,
                &args(&[
                    ("database_name", "db"),
                    ("container_name", "c"),
                    ("item_id", "  "),
                    ("partition_key", "pk")
                ])
            ),
            Err("item_id")
        );
    }

    #[test]
    fn validate_ignores_extra_arguments() {
        for spec in catalog() {
            let mut arguments: Arguments =
                spec.params.iter().map(|p| (p.name.to_string(), "x".to_string())).collect();
            arguments.insert("unexpected".to_string(), "ignored".to_string());
            assert_eq!(validate(spec, &arguments), Ok(()), "{}", spec.name);
        }
    }
}
