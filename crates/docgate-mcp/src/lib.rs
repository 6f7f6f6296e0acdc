//! Docgate tool gateway and MCP (Model Context Protocol) server
//!
//! [`ToolGateway`] validates named tool invocations and dispatches them to an
//! injected [`docgate_core::DocumentStore`], answering every call with a flat
//! [`ToolResult`] envelope. [`McpServer`] exposes the gateway over JSON-RPC on
//! stdio or HTTP.

pub mod app_state;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod governance;
pub mod jsonrpc;
pub mod mcp;
pub mod server;
pub mod tools;

// Re-export key types
pub use app_state::{open_store, AppState};
pub use envelope::{coerce_arguments, Arguments, ToolErrorKind, ToolRequest, ToolResult};
pub use error::{McpError, McpResult};
pub use gateway::ToolGateway;
pub use governance::GovernanceConfig;
pub use server::McpServer;
pub use tools::{catalog, find_tool, ParamKind, ParamSpec, ToolSpec};

pub use server::{router, serve_http, serve_lines, serve_stdio};
