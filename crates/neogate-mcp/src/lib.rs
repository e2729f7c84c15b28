//! Read-only MCP gateway to a Neo4j database.
//!
//! Exposes introspection and query tools over JSON-RPC 2.0 on stdio. All
//! Cypher submitted through the query tool passes a read-only guard before
//! it reaches the driver, and all results are normalized to plain JSON.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::{McpServer, ServerConfig};

pub const SERVER_NAME: &str = "neogate-mcp";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
