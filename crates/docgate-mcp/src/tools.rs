//! Static catalog of the tools the gateway exposes

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

/// Value type of a tool parameter. Every argument travels as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Parameters in the order they are validated
    pub params: Vec<ParamSpec>,
    pub read_only: bool,
    /// Additional names the tool answers to
    pub aliases: &'static [&'static str],
}

pub const LIST_DATABASES: &str = "list_databases";
pub const LIST_CONTAINERS: &str = "list_containers";
pub const QUERY_ITEMS: &str = "query_items";
pub const GET_ITEM: &str = "get_item";
pub const DELETE_ITEM: &str = "delete_item";
pub const UPSERT_ITEM: &str = "upsert_item";

fn param(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::String, required: true, description }
}

static CATALOG: Lazy<Vec<ToolSpec>> = Lazy::new(|| {
    vec![
        ToolSpec {
            name: LIST_DATABASES,
            description: "List all databases in the document store account.",
            params: vec![],
            read_only: true,
            aliases: &[],
        },
        ToolSpec {
            name: LIST_CONTAINERS,
            description: "List all containers in a specific database.",
            params: vec![param("database_name", "The name of the database to list containers from.")],
            read_only: true,
            aliases: &[],
        },
        ToolSpec {
            name: QUERY_ITEMS,
            description: "Execute a SQL query against a container to retrieve items.",
            params: vec![
                param("database_name", "The name of the database."),
                param("container_name", "The name of the container to query."),
                param(
                    "query",
                    "The SQL query to execute (e.g., 'SELECT * FROM c WHERE c.category = \"electronics\"').",
                ),
            ],
            read_only: true,
            aliases: &[],
        },
        ToolSpec {
            name: GET_ITEM,
            description: "Retrieve a single item from a container by its ID and partition key.",
            params: vec![
                param("database_name", "The name of the database."),
                param("container_name", "The name of the container."),
                param("item_id", "The ID of the item to retrieve."),
                param("partition_key", "The partition key value for the item."),
            ],
            read_only: true,
            aliases: &[],
        },
        ToolSpec {
            name: DELETE_ITEM,
            description: "Delete an item from a container by its ID and partition key.",
            params: vec![
                param("database_name", "The name of the database."),
                param("container_name", "The name of the container."),
                param("item_id", "The ID of the item to delete."),
                param("partition_key", "The partition key value for the item."),
            ],
            read_only: false,
            aliases: &[],
        },
        ToolSpec {
            name: UPSERT_ITEM,
            description: "Update or insert an item in a container. If an item with the same ID exists \
                          in the same partition it is replaced with the new data; otherwise a new item is created.",
            params: vec![
                param("database_name", "The name of the database."),
                param("container_name", "The name of the container."),
                param("item", "The JSON string representing the item to upsert (insert or update)."),
            ],
            read_only: false,
            aliases: &["update_item"],
        },
    ]
});

/// All tools in catalog order
pub fn catalog() -> &'static [ToolSpec] {
    CATALOG.as_slice()
}

/// Look a tool up by name or alias
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    catalog().iter().find(|spec| spec.name == name || spec.aliases.iter().any(|alias| *alias == name))
}

impl ToolSpec {
    /// JSON Schema of the tool's arguments
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.to_string(),
                json!({"type": param.kind.json_type(), "description": param.description}),
            );
        }
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();
        json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        })
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// Deleting and upserting overwrite or remove stored data
    pub fn is_destructive(&self) -> bool {
        !self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_unique_tools() {
        let names: Vec<&str> = catalog().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![LIST_DATABASES, LIST_CONTAINERS, QUERY_ITEMS, GET_ITEM, DELETE_ITEM, UPSERT_ITEM]
        );
    }

    #[test]
    fn alias_resolves_to_upsert() {
        assert_eq!(find_tool("update_item").map(|t| t.name), Some(UPSERT_ITEM));
        assert_eq!(find_tool(UPSERT_ITEM).map(|t| t.name), Some(UPSERT_ITEM));
        assert!(find_tool("drop_database").is_none());
    }

    #[test]
    fn input_schema_lists_required_params_in_order() {
        let schema = find_tool(GET_ITEM).unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["database_name", "container_name", "item_id", "partition_key"])
        );
        assert_eq!(schema["properties"]["item_id"]["type"], "string");

        let schema = find_tool(LIST_DATABASES).unwrap().input_schema();
        assert_eq!(schema["required"], json!([]));
    }
}
