//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

#[derive(Parser)]
#[command(
    name = "docgate",
    about = "Docgate - tool gateway for partitioned document stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, env = "DOCGATE_CONFIG", help = "Configuration file (YAML or JSON)")]
    pub config: Option<String>,

    /// Store url, overrides the configuration file
    #[arg(
        long,
        env = "DOCGATE_STORE_URL",
        help = "Store url: 'memory' or 'sqlite://<path>'"
    )]
    pub store: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server
    Serve {
        #[command(flatten)]
        args: crate::commands::ServeArgs,
    },

    /// Show the tool catalog
    Tools {
        /// Output format
        #[arg(long, value_enum, default_value = "table", help = "Output format")]
        format: OutputFormat,
    },

    /// Invoke one tool and print its result envelope
    Invoke {
        /// Tool name
        #[arg(help = "Tool name (e.g., query_items)")]
        tool: String,

        /// Arguments as key=value pairs
        #[arg(long = "arg", value_name = "KEY=VALUE", help = "Tool argument, may be repeated")]
        pairs: Vec<String>,

        /// Arguments as a JSON object
        #[arg(long = "args", value_name = "JSON", help = "Tool arguments as a JSON object")]
        json_args: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },

    /// Create a database and container
    Init {
        /// Database name
        database: String,

        /// Container name
        container: String,

        /// Partition key path of the container
        #[arg(long, default_value = "/category", help = "Partition key path")]
        partition_key: String,
    },

    /// Load the sample product catalog
    Seed {
        #[arg(long, default_value = "SampleDB")]
        database: String,

        #[arg(long, default_value = "Products")]
        container: String,
    },

    /// Lowercase every item's category, moving it to the new partition
    MigrateCategories {
        #[arg(long, default_value = "SampleDB")]
        database: String,

        #[arg(long, default_value = "Products")]
        container: String,

        /// Only report what would change
        #[arg(long, help = "Show what would change without writing")]
        dry_run: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> crate::error::CliResult<String> {
        Ok(match self {
            // tables are rendered by the commands that support them
            Self::Table | Self::Pretty => serde_json::to_string_pretty(value)?,
            Self::Json => serde_json::to_string(value)?,
            Self::Yaml => serde_yaml::to_string(value)?,
        })
    }
}
