//! Neo4j connection management and the shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query};
use tokio::sync::OnceCell;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Result conversion error: {0}")]
    Conversion(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j graph client.
///
/// The underlying driver manages its own connection pool, so one client is
/// safe for concurrent use across requests. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a read query and collect all rows.
    ///
    /// The driver row stream is the per-request resource: it is fully drained
    /// before returning, and dropped on every exit path. No partial results
    /// escape this method.
    pub async fn execute_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn execute_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}

/// Shared, lazily-initialized connection to Neo4j.
///
/// Owned by the server for its entire lifetime and injected into the tool
/// layer, so tests can construct a handle against an unreachable address and
/// exercise failure paths without a network. The first successful connect is
/// cached; a failed connect is not, so a later call attempts a fresh
/// connection instead of replaying the cached error. An established client
/// is never torn down automatically.
pub struct ConnectionHandle {
    config: GraphConfig,
    client: OnceCell<GraphClient>,
}

impl ConnectionHandle {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// The connection target, for diagnostics.
    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Get the shared client, connecting on first use.
    pub async fn client(&self) -> Result<&GraphClient, GraphError> {
        self.client
            .get_or_try_init(|| GraphClient::connect(&self.config))
            .await
    }

    /// Whether a connection has been established yet.
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_bolt() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "neo4j");
        assert!(config.password.is_empty());
    }

    #[test]
    fn handle_starts_unconnected() {
        let handle = ConnectionHandle::new(GraphConfig::default());
        assert!(!handle.is_connected());
        assert_eq!(handle.uri(), "bolt://localhost:7687");
    }
}
