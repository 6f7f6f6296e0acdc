//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use colored::{ColoredString, Colorize};
use docgate_config::{ConfigLoader, DocgateConfig};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing on stderr; stdout is reserved for command output and the stdio transport
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Load the configuration file if one is given, then apply the `--store` override
pub fn load_config(config_path: Option<&str>, store_url: Option<&str>) -> CliResult<DocgateConfig> {
    let mut config = match config_path {
        Some(path) => {
            debug!("Loading configuration from {}", path);
            ConfigLoader::default().load_from_file(path)?
        }
        None => DocgateConfig::default(),
    };

    if let Some(url) = store_url {
        config.store.url = url.to_string();
    }
    config.validate()?;
    Ok(config)
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn info(msg: &str) -> ColoredString {
        msg.blue()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_text("list_databases", 20), "list_databases");
        assert_eq!(truncate_text("Execute a SQL query", 10), "Execute...");
    }

    #[test]
    fn store_flag_overrides_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "store:\n  url: memory\ngovernance:\n  max_concurrency: 3").unwrap();
        let path = file.path().to_str().unwrap();

        let config = load_config(Some(path), None).unwrap();
        assert_eq!(config.store.url, "memory");
        assert_eq!(config.governance.max_concurrency, 3);

        let config = load_config(Some(path), Some("sqlite://./other.db")).unwrap();
        assert_eq!(config.store.url, "sqlite://./other.db");
    }

    #[test]
    fn defaults_without_config_file() {
        let config = load_config(None, None).unwrap();
        assert_eq!(config, DocgateConfig::default());
    }
}
