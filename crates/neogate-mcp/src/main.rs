use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use neogate_graph::{ConnectionHandle, GraphConfig};
use neogate_mcp::{McpServer, ServerConfig};

/// Read-only MCP server for Neo4j.
#[derive(Debug, Parser)]
#[command(name = "neogate-mcp", version, about)]
struct Cli {
    /// Neo4j connection URI
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    uri: String,

    /// Neo4j username
    #[arg(long, env = "NEO4J_USERNAME", default_value = "neo4j")]
    username: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let password = match cli.password {
        Some(p) if !p.is_empty() => p,
        _ => bail!("a Neo4j password is required (--password or NEO4J_PASSWORD)"),
    };

    let config = GraphConfig {
        uri: cli.uri,
        user: cli.username,
        password,
        ..GraphConfig::default()
    };

    let handle = Arc::new(ConnectionHandle::new(config));
    let mut server = McpServer::new(ServerConfig::default(), handle);
    server.run_stdio().await?;

    Ok(())
}
