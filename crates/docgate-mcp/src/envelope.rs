//! Request and response envelopes of the tool gateway

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Named string arguments of one invocation
pub type Arguments = BTreeMap<String, String>;

/// Wire request: `{"toolName": "...", "arguments": {"key": "value"}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: Arguments,
}

impl ToolRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self { tool_name: tool_name.into(), arguments }
    }
}

/// Convert loosely typed JSON arguments to strings.
///
/// Strings are kept as is; objects, arrays, numbers and booleans become their
/// compact JSON text; `null` drops the argument.
pub fn coerce_arguments(raw: Map<String, Value>) -> Arguments {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

fn deserialize_arguments<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(coerce_arguments).unwrap_or_default())
}

/// Failure category of a tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// Unknown tool or missing required argument; the store was not contacted
    Validation,
    /// Database, container or item does not exist
    NotFound,
    /// The `item` argument could not be used as a document; the store was not contacted
    MalformedInput,
    /// Any other store failure, message passed through
    Store,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::Validation => "validation",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::MalformedInput => "malformed_input",
            ToolErrorKind::Store => "store",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one invocation.
///
/// Serializes flat: `{"success": true, ...payload}` or `{"success": false, "error": "..."}`.
/// The error kind is for in-process callers and is not part of the wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Map<String, Value>),
    Failure { kind: ToolErrorKind, message: String },
}

impl ToolResult {
    pub fn success(payload: Map<String, Value>) -> Self {
        ToolResult::Success(payload)
    }

    pub fn failure(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        ToolResult::Failure { kind, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            ToolResult::Success(payload) => Some(payload),
            ToolResult::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Success(_) => None,
            ToolResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        match self {
            ToolResult::Success(_) => None,
            ToolResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Flat JSON form
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        match self {
            ToolResult::Success(payload) => {
                object.insert("success".to_string(), Value::Bool(true));
                object.extend(payload.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            ToolResult::Failure { message, .. } => {
                object.insert("success".to_string(), Value::Bool(false));
                object.insert("error".to_string(), Value::String(message.clone()));
            }
        }
        Value::Object(object)
    }
}

impl Serialize for ToolResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ToolResult::Success(payload) => {
                let mut map = serializer.serialize_map(Some(payload.len() + 1))?;
                map.serialize_entry("success", &true)?;
                for (key, value) in payload {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ToolResult::Failure { message, .. } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_coerces_non_string_arguments() {
        let request: ToolRequest = serde_json::from_value(json!({
            "toolName": "upsert_item",
            "arguments": {
                "database_name": "SampleDB",
                "item": {"id": "1", "tags": ["a"]},
                "limit": 5,
                "flag": true,
                "partition_key": null
            }
        }))
        .unwrap();

        assert_eq!(request.tool_name, "upsert_item");
        assert_eq!(request.arguments["database_name"], "SampleDB");
        assert_eq!(request.arguments["item"], r#"{"id":"1","tags":["a"]}"#);
        assert_eq!(request.arguments["limit"], "5");
        assert_eq!(request.arguments["flag"], "true");
        assert!(!request.arguments.contains_key("partition_key"));
    }

    #[test]
    fn request_without_arguments() {
        let request: ToolRequest = serde_json::from_str(r#"{"toolName": "list_databases"}"#).unwrap();
        assert!(request.arguments.is_empty());

        let request: ToolRequest =
            serde_json::from_str(r#"{"toolName": "list_databases", "arguments": null}"#).unwrap();
        assert!(request.arguments.is_empty());
    }

    #[test]
    fn success_serializes_flat() {
        let mut payload = Map::new();
        payload.insert("databases".into(), json!(["SampleDB"]));
        payload.insert("count".into(), json!(1));
        let result = ToolResult::success(payload);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"success": true, "databases": ["SampleDB"], "count": 1}));
        assert_eq!(value, result.to_json());
    }

    #[test]
    fn failure_serializes_without_kind() {
        let result = ToolResult::failure(ToolErrorKind::NotFound, "Item '7' not found");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": "Item '7' not found"})
        );
        assert_eq!(result.error_kind(), Some(ToolErrorKind::NotFound));
        assert!(!result.is_success());
        assert!(result.payload().is_none());
    }
}
