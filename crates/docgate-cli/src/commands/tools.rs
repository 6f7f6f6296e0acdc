//! Tool catalog command

use docgate_mcp::mcp::Tool;
use docgate_mcp::{catalog, ToolSpec};
use serde_json::Value as JsonValue;

use crate::{
    cli::OutputFormat,
    error::CliResult,
    utils::{truncate_text, ColoredOutput},
};

pub struct ToolsCommand;

impl ToolsCommand {
    pub fn run(format: OutputFormat) -> CliResult<()> {
        match format {
            OutputFormat::Table => Self::display_table(catalog()),
            _ => println!("{}", format.format_json(&Self::catalog_json())?),
        }
        Ok(())
    }

    /// Catalog as MCP tool descriptors
    pub fn catalog_json() -> JsonValue {
        JsonValue::Array(
            catalog()
                .iter()
                .map(|spec| serde_json::to_value(Tool::from(spec)).unwrap_or(JsonValue::Null))
                .collect(),
        )
    }

    fn display_table(tools: &[ToolSpec]) {
        println!(
            "{:<18} {:<12} {:<58} {}",
            ColoredOutput::highlight("TOOL"),
            ColoredOutput::highlight("ACCESS"),
            ColoredOutput::highlight("ARGUMENTS"),
            ColoredOutput::highlight("DESCRIPTION")
        );
        for spec in tools {
            let access = if spec.read_only {
                ColoredOutput::success("read-only")
            } else {
                ColoredOutput::warning("destructive")
            };
            let arguments: Vec<&str> = spec.required_params().map(|p| p.name).collect();
            let mut name = spec.name.to_string();
            if !spec.aliases.is_empty() {
                name = format!("{} ({})", name, spec.aliases.join(", "));
            }
            println!(
                "{:<18} {:<12} {:<58} {}",
                name,
                access,
                ColoredOutput::dim(&arguments.join(", ")),
                truncate_text(spec.description, 60)
            );
        }
        println!();
        println!("Total: {} tools", tools.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_json_lists_every_tool() {
        let tools = ToolsCommand::catalog_json();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["list_databases", "list_containers", "query_items", "get_item", "delete_item", "upsert_item"]
        );
        assert_eq!(tools[5]["inputSchema"]["required"], serde_json::json!(["database_name", "container_name", "item"]));
    }
}
