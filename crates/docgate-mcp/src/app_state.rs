//! Application state management for MCP server

use docgate_config::StoreConfig;
use docgate_core::DocumentStore;
use docgate_store::{MemoryDocumentStore, SqlDocumentStore};
use std::sync::Arc;

use crate::gateway::ToolGateway;
use crate::McpResult;

/// Shared application state: the store client and the gateway built over it
#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: ToolGateway,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { gateway: ToolGateway::new(store) }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.gateway.store()
    }

    /// Open the store named by configuration
    pub async fn from_store_config(config: &StoreConfig) -> McpResult<Self> {
        Ok(Self::new(open_store(config).await?))
    }
}

/// Build a store client from `memory` or `sqlite://...` urls
pub async fn open_store(config: &StoreConfig) -> McpResult<Arc<dyn DocumentStore>> {
    if config.url == "memory" {
        tracing::info!("using in-memory document store");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    }
    tracing::info!(url = %config.url, "opening sqlite document store");
    let store = SqlDocumentStore::new_with_config(&config.url, config.max_connections).await?;
    Ok(Arc::new(store))
}
