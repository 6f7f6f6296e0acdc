//! One-shot tool invocation

use docgate_config::DocgateConfig;
use docgate_mcp::{coerce_arguments, AppState, Arguments, GovernanceConfig, McpServer, ToolRequest, ToolResult};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::{
    cli::OutputFormat,
    error::{CliError, CliResult},
    utils::ColoredOutput,
};

pub struct InvokeCommand;

impl InvokeCommand {
    /// Dispatch one tool through the configured store and print the envelope.
    ///
    /// Tool failures are returned as an unsuccessful [`ToolResult`], not an error.
    pub async fn run(
        config: &DocgateConfig,
        tool: &str,
        pairs: &[String],
        json_args: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<ToolResult> {
        let arguments = Self::build_arguments(pairs, json_args)?;
        debug!("Arguments: {:?}", arguments.keys().collect::<Vec<_>>());

        let app_state = AppState::from_store_config(&config.store).await?;
        let server = McpServer::new(app_state, GovernanceConfig::from(&config.governance));

        info!("Invoking tool: {}", tool);
        let result = server.invoke(&ToolRequest::new(tool, arguments)).await?;

        Self::display_result(&result, format)?;
        Ok(result)
    }

    /// Merge `--args` JSON with `--arg key=value` pairs; pairs win
    pub fn build_arguments(pairs: &[String], json_args: Option<&str>) -> CliResult<Arguments> {
        let mut arguments = match json_args {
            Some(raw) => match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Object(map)) => coerce_arguments(map),
                Ok(_) => {
                    return Err(CliError::InvalidArgument(
                        "--args must be a JSON object".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(CliError::InvalidArgument(format!("Invalid JSON in --args: {}", e)))
                }
            },
            None => Arguments::new(),
        };

        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CliError::InvalidArgument(format!("Expected KEY=VALUE, got '{}'", pair))
            })?;
            if key.trim().is_empty() {
                return Err(CliError::InvalidArgument(format!("Empty key in '{}'", pair)));
            }
            arguments.insert(key.trim().to_string(), value.to_string());
        }

        Ok(arguments)
    }

    fn display_result(result: &ToolResult, format: OutputFormat) -> CliResult<()> {
        let rendered = format.format_json(&result.to_json())?;
        if result.is_success() {
            println!("{}", rendered);
        } else {
            eprintln!("{}", ColoredOutput::error("Tool failed"));
            println!("{}", rendered);
        }
        Ok(())
    }
}
