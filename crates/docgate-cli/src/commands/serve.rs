//! MCP server command

use clap::Args;
use docgate_config::{DocgateConfig, Transport};
use docgate_mcp::{serve_http, serve_stdio, AppState, GovernanceConfig};
use tracing::info;

use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Serve over stdio
    #[arg(long, conflicts_with = "http")]
    pub stdio: bool,

    /// Serve over HTTP on this address
    #[arg(long, value_name = "ADDR")]
    pub http: Option<String>,

    /// Allow specific tools (patterns supported, e.g., "list_*", "get_item")
    #[arg(
        long,
        help = "Allow specific tools (patterns supported, e.g., 'list_*', 'get_item')"
    )]
    pub allow: Vec<String>,

    /// Deny specific tools (patterns supported, e.g., "delete_*")
    #[arg(long, help = "Deny specific tools (patterns supported, e.g., 'delete_*')")]
    pub deny: Vec<String>,

    /// Maximum concurrent tool executions
    #[arg(long, help = "Maximum concurrent tool executions")]
    pub max_concurrency: Option<usize>,
}

/// Where the server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listen {
    Stdio,
    Http(String),
}

impl ServeArgs {
    /// Flags win over the configuration file
    pub fn governance(&self, config: &DocgateConfig) -> GovernanceConfig {
        let settings = &config.governance;
        let allow = if self.allow.is_empty() { settings.allow.clone() } else { self.allow.clone() };
        let deny = if self.deny.is_empty() { settings.deny.clone() } else { self.deny.clone() };
        GovernanceConfig::new(allow, deny, self.max_concurrency.unwrap_or(settings.max_concurrency))
    }

    pub fn listen(&self, config: &DocgateConfig) -> Listen {
        if let Some(addr) = &self.http {
            return Listen::Http(addr.clone());
        }
        if self.stdio {
            return Listen::Stdio;
        }
        match config.server.transport {
            Transport::Http => Listen::Http(config.server.http_addr.clone()),
            Transport::Stdio => Listen::Stdio,
        }
    }
}

pub async fn execute(args: ServeArgs, config: &DocgateConfig) -> CliResult<()> {
    info!("Starting Docgate MCP server");
    info!("Store: {}", config.store.url);

    let governance = args.governance(config);
    let app_state = AppState::from_store_config(&config.store).await?;

    match args.listen(config) {
        Listen::Http(addr) => serve_http(app_state, governance, &addr).await?,
        Listen::Stdio => serve_stdio(app_state, governance).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["docgate", "serve"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Serve { args } => args,
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn transport_defaults_to_config() {
        let mut config = DocgateConfig::default();
        assert_eq!(serve_args(&[]).listen(&config), Listen::Stdio);

        config.server.transport = Transport::Http;
        assert_eq!(serve_args(&[]).listen(&config), Listen::Http("127.0.0.1:8787".to_string()));
        assert_eq!(serve_args(&["--stdio"]).listen(&config), Listen::Stdio);
        assert_eq!(
            serve_args(&["--http", "0.0.0.0:9000"]).listen(&config),
            Listen::Http("0.0.0.0:9000".to_string())
        );
    }

    #[test]
    fn governance_flags_override_config() {
        let mut config = DocgateConfig::default();
        config.governance.deny = vec!["delete_*".to_string()];
        config.governance.max_concurrency = 4;

        let governance = serve_args(&[]).governance(&config);
        assert!(!governance.is_tool_allowed("delete_item"));
        assert_eq!(governance.max_concurrency, 4);

        let governance =
            serve_args(&["--deny", "upsert_item", "--max-concurrency", "2"]).governance(&config);
        assert!(governance.is_tool_allowed("delete_item"));
        assert!(!governance.is_tool_allowed("upsert_item"));
        assert_eq!(governance.max_concurrency, 2);
    }

    #[test]
    fn stdio_and_http_conflict() {
        assert!(Cli::try_parse_from(["docgate", "serve", "--stdio", "--http", "127.0.0.1:1"]).is_err());
    }
}
