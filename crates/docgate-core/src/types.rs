use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A stored document: a JSON object that always carries a string `id`
pub type StoreItem = Map<String, JsonValue>;

/// Logical partition key value of an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey(pub String);

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render a JSON value the way it is used for partition routing.
    /// Strings keep their text, missing and null map to the empty key.
    pub fn from_value(value: Option<&JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => Self(String::new()),
            Some(JsonValue::String(s)) => Self(s.clone()),
            Some(other) => Self(other.to_string()),
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON path of the partition key inside items, e.g. `/category`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyPath(String);

impl PartitionKeyPath {
    pub fn new(path: impl Into<String>) -> StoreResult<Self> {
        let path = path.into();
        let valid = path.starts_with('/') && path[1..].split('/').all(|segment| !segment.is_empty());
        if !valid {
            return Err(StoreError::BadRequest(format!(
                "Invalid partition key path '{}': expected '/field' or '/field/nested'",
                path
            )));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split('/')
    }

    pub fn resolve<'a>(&self, item: &'a StoreItem) -> Option<&'a JsonValue> {
        let mut segments = self.segments();
        let first = segments.next()?;
        let mut current = item.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn partition_key_of(&self, item: &StoreItem) -> PartitionKey {
        PartitionKey::from_value(self.resolve(item))
    }
}

impl std::fmt::Display for PartitionKeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the item id, rejecting items without a non-empty string `id`
pub fn item_id(item: &StoreItem) -> StoreResult<&str> {
    match item.get("id") {
        Some(JsonValue::String(id)) if !id.is_empty() => Ok(id.as_str()),
        _ => Err(StoreError::BadRequest(
            "Item must contain a non-empty string 'id' field".to_string(),
        )),
    }
}

/// Set the `_ts` and `_etag` system properties on a freshly written item
pub fn stamp_system_properties(item: &mut StoreItem) {
    item.insert("_ts".to_string(), JsonValue::from(Utc::now().timestamp()));
    item.insert("_etag".to_string(), JsonValue::String(format!("\"{}\"", Uuid::new_v4())));
}
