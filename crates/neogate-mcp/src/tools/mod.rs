//! Read-only Neo4j tools for the MCP server.
//!
//! Available tools:
//! - `neo4j_query`: run an arbitrary read-only Cypher query
//! - `neo4j_schema`: labels, relationship types, and property keys overview
//! - `neo4j_labels`: node labels
//! - `neo4j_relationship_types`: relationship types
//! - `neo4j_property_keys`: property keys
//! - `neo4j_node_count`: count nodes, optionally by label
//! - `neo4j_relationship_count`: count relationships, optionally by type
//! - `neo4j_sample_data`: sample nodes or relationships
//! - `neo4j_node_properties`: property usage analysis for a label
//! - `neo4j_relationship_properties`: property usage analysis for a type
//! - `neo4j_database_info`: server name, version, and edition
//!
//! Every tool failure (guard rejection, bad arguments, driver error) is
//! returned as a textual error result; only an unknown tool name is a
//! protocol-level fault.

mod properties;
mod query;
mod schema;
mod stats;

pub use properties::{PropertyAnalysis, PropertyCount};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

use neogate_core::{CypherGuard, IdentError};
use neogate_graph::{ConnectionHandle, GraphError};

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, Tool};

/// Shared state injected into every tool invocation.
pub struct ToolContext {
    pub handle: Arc<ConnectionHandle>,
    pub guard: CypherGuard,
}

impl ToolContext {
    pub fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self {
            handle,
            guard: CypherGuard::default(),
        }
    }
}

/// A failure local to one tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Query rejected: {0}")]
    Rejected(String),

    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentError),

    #[error("Database error: {0}")]
    Graph(#[from] GraphError),
}

type ToolResult = Result<JsonValue, ToolError>;

/// Deserialize tool arguments, treating absent arguments as `{}` so tools
/// with only optional fields work without any.
fn parse_args<T: DeserializeOwned>(arguments: Option<JsonValue>) -> Result<T, ToolError> {
    let value = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| ToolError::Arguments(e.to_string()))
}

fn schema_object(required: &[&str], properties: JsonValue) -> JsonValue {
    json!({
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "neo4j_query".to_string(),
            description: "Run a read-only Cypher query against the Neo4j database. \
                          Mutating statements (CREATE, MERGE, SET, DELETE, ...) are rejected \
                          before execution. Use a LIMIT clause to bound result size."
                .to_string(),
            input_schema: schema_object(
                &["query"],
                json!({
                    "query": {"type": "string", "description": "Cypher query to execute"},
                    "parameters": {"type": "object", "description": "Query parameters referenced as $name"},
                }),
            ),
        },
        Tool {
            name: "neo4j_schema".to_string(),
            description: "Get a schema overview: all node labels, relationship types, and \
                          property keys in the database."
                .to_string(),
            input_schema: schema_object(&[], json!({})),
        },
        Tool {
            name: "neo4j_labels".to_string(),
            description: "List all node labels in the database.".to_string(),
            input_schema: schema_object(&[], json!({})),
        },
        Tool {
            name: "neo4j_relationship_types".to_string(),
            description: "List all relationship types in the database.".to_string(),
            input_schema: schema_object(&[], json!({})),
        },
        Tool {
            name: "neo4j_property_keys".to_string(),
            description: "List all property keys in the database.".to_string(),
            input_schema: schema_object(&[], json!({})),
        },
        Tool {
            name: "neo4j_node_count".to_string(),
            description: "Count nodes in the database, optionally restricted to one label."
                .to_string(),
            input_schema: schema_object(
                &[],
                json!({
                    "label": {"type": "string", "description": "Node label to count (all nodes if omitted)"},
                }),
            ),
        },
        Tool {
            name: "neo4j_relationship_count".to_string(),
            description: "Count relationships in the database, optionally restricted to one type."
                .to_string(),
            input_schema: schema_object(
                &[],
                json!({
                    "relationshipType": {"type": "string", "description": "Relationship type to count (all if omitted)"},
                }),
            ),
        },
        Tool {
            name: "neo4j_sample_data".to_string(),
            description: "Fetch sample data: nodes for a label, or relationships with their \
                          endpoint nodes for a relationship type. Label and relationshipType \
                          are mutually exclusive."
                .to_string(),
            input_schema: schema_object(
                &[],
                json!({
                    "label": {"type": "string", "description": "Sample nodes with this label"},
                    "relationshipType": {"type": "string", "description": "Sample relationships of this type"},
                    "limit": {"type": "number", "description": "Number of samples, 1-50 (default 10)"},
                }),
            ),
        },
        Tool {
            name: "neo4j_node_properties".to_string(),
            description: "Analyze which properties nodes with a label carry and how often. \
                          Uses apoc.meta when available, otherwise falls back to key sampling."
                .to_string(),
            input_schema: schema_object(
                &["label"],
                json!({
                    "label": {"type": "string", "description": "Node label to analyze"},
                    "sampleSize": {"type": "number", "description": "Number of entities to sample (default 1000)"},
                }),
            ),
        },
        Tool {
            name: "neo4j_relationship_properties".to_string(),
            description: "Analyze which properties relationships of a type carry and how often. \
                          Uses apoc.meta when available, otherwise falls back to key sampling."
                .to_string(),
            input_schema: schema_object(
                &["relationshipType"],
                json!({
                    "relationshipType": {"type": "string", "description": "Relationship type to analyze"},
                    "sampleSize": {"type": "number", "description": "Number of entities to sample (default 1000)"},
                }),
            ),
        },
        Tool {
            name: "neo4j_database_info".to_string(),
            description: "Get Neo4j server components with name, version, and edition."
                .to_string(),
            input_schema: schema_object(&[], json!({})),
        },
    ]
}

/// Execute a tool by name.
pub async fn execute_tool(
    name: &str,
    arguments: Option<JsonValue>,
    context: &ToolContext,
) -> McpResult<CallToolResult> {
    let result = match name {
        "neo4j_query" => query::run_query(context, arguments).await,
        "neo4j_schema" => schema::schema_overview(context).await,
        "neo4j_labels" => schema::labels(context).await,
        "neo4j_relationship_types" => schema::relationship_types(context).await,
        "neo4j_property_keys" => schema::property_keys(context).await,
        "neo4j_node_count" => stats::node_count(context, arguments).await,
        "neo4j_relationship_count" => stats::relationship_count(context, arguments).await,
        "neo4j_sample_data" => stats::sample_data(context, arguments).await,
        "neo4j_node_properties" => properties::node_properties(context, arguments).await,
        "neo4j_relationship_properties" => {
            properties::relationship_properties(context, arguments).await
        }
        "neo4j_database_info" => schema::database_info(context).await,
        _ => return Err(McpError::ToolNotFound(name.to_string())),
    };

    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)?;
            Ok(CallToolResult::text(text))
        }
        Err(e) => {
            tracing::debug!(tool = name, error = %e, "tool invocation failed");
            Ok(CallToolResult::error(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_all_eleven_tools() {
        let tools = get_tools();
        assert_eq!(tools.len(), 11);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        for expected in [
            "neo4j_query",
            "neo4j_schema",
            "neo4j_labels",
            "neo4j_relationship_types",
            "neo4j_property_keys",
            "neo4j_node_count",
            "neo4j_relationship_count",
            "neo4j_sample_data",
            "neo4j_node_properties",
            "neo4j_relationship_properties",
            "neo4j_database_info",
        ] {
            assert!(names.contains(&expected), "missing tool {expected}");
        }
    }

    #[test]
    fn every_tool_has_description_and_object_schema() {
        for tool in get_tools() {
            assert!(!tool.description.is_empty(), "{} lacks description", tool.name);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.input_schema.get("properties").is_some(), "{}", tool.name);
        }
    }
}
