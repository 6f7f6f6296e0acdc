//! Error handling for the Docgate MCP server

use crate::jsonrpc::JsonRpcError;
use axum::http::StatusCode;
use docgate_config::ConfigError;
use docgate_core::StoreError;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Protocol-level failures. Tool failures are envelopes, not errors.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidArguments(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::Serialization(e) => {
                JsonRpcError::invalid_params().with_message(e.to_string())
            }
            McpError::InvalidArguments(msg) => JsonRpcError::invalid_params().with_message(msg.clone()),
            McpError::PermissionDenied(msg) => {
                JsonRpcError::invalid_request().with_message(format!("Permission denied: {}", msg))
            }
            _ => JsonRpcError::internal_error().with_message(self.to_string()),
        }
    }

    /// HTTP status for the HTTP transport
    pub fn status_code(&self) -> StatusCode {
        match self {
            McpError::InvalidArguments(_) | McpError::Serialization(_) => StatusCode::BAD_REQUEST,
            McpError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
