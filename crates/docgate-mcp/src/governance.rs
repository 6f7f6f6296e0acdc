//! Tool exposure policy and concurrency limits for the MCP server

use docgate_config::GovernanceSettings;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Governance configuration for MCP server
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Allowed tool patterns (e.g., ["list_*", "get_item"]); empty allows all
    pub allow_patterns: Vec<String>,
    /// Denied tool patterns (e.g., ["delete_*", "*_item"]); checked after allow
    pub deny_patterns: Vec<String>,
    /// Maximum concurrent tool executions
    pub max_concurrency: usize,
    pub concurrency_limiter: Arc<Semaphore>,
}

impl GovernanceConfig {
    pub fn new(allow_patterns: Vec<String>, deny_patterns: Vec<String>, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            allow_patterns,
            deny_patterns,
            max_concurrency,
            concurrency_limiter: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Check if a tool is allowed by governance policies
    pub fn is_tool_allowed(&self, tool_name: &str) -> bool {
        if !self.allow_patterns.is_empty()
            && !self.allow_patterns.iter().any(|pattern| matches_pattern(tool_name, pattern))
        {
            return false;
        }

        !self.deny_patterns.iter().any(|pattern| matches_pattern(tool_name, pattern))
    }
}

impl From<&GovernanceSettings> for GovernanceConfig {
    fn from(settings: &GovernanceSettings) -> Self {
        Self::new(settings.allow.clone(), settings.deny.clone(), settings.max_concurrency)
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self::from(&GovernanceSettings::default())
    }
}

/// Wildcard matching: `*`, exact names, `prefix*` and `*suffix`
fn matches_pattern(tool_name: &str, pattern: &str) -> bool {
    if pattern == "*" || pattern == tool_name {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return tool_name.starts_with(prefix);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return tool_name.ends_with(suffix);
    }

    false
}
