//! Count and sample tools.
//!
//! These tools interpolate caller-supplied labels and relationship types
//! into query templates, so every identifier is validated before it touches
//! the template. That check is independent of the query guard: the guard
//! scans whole queries, not fragments assembled into one.

use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use neogate_core::{normalize, validate_identifier};
use neogate_graph::convert_row;

use super::{parse_args, ToolContext, ToolError, ToolResult};

const SAMPLE_LIMIT_MAX: i64 = 50;
const SAMPLE_LIMIT_DEFAULT: i64 = 10;

#[derive(Debug, Deserialize)]
struct NodeCountArgs {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelationshipCountArgs {
    #[serde(default, rename = "relationshipType")]
    relationship_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SampleArgs {
    #[serde(default)]
    label: Option<String>,
    #[serde(default, rename = "relationshipType")]
    relationship_type: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

async fn count(context: &ToolContext, cypher: &str) -> Result<i64, ToolError> {
    let client = context.handle.client().await?;
    let row = client.execute_one(neo4rs::query(cypher)).await?;
    Ok(row.map(|r| r.get::<i64>("count").unwrap_or(0)).unwrap_or(0))
}

pub(super) async fn node_count(context: &ToolContext, arguments: Option<JsonValue>) -> ToolResult {
    let args: NodeCountArgs = parse_args(arguments)?;

    let cypher = match &args.label {
        Some(label) => {
            validate_identifier(label)?;
            format!("MATCH (n:{label}) RETURN count(n) AS count")
        }
        None => "MATCH (n) RETURN count(n) AS count".to_string(),
    };

    let count = count(context, &cypher).await?;
    Ok(json!({"label": args.label, "count": count}))
}

pub(super) async fn relationship_count(
    context: &ToolContext,
    arguments: Option<JsonValue>,
) -> ToolResult {
    let args: RelationshipCountArgs = parse_args(arguments)?;

    let cypher = match &args.relationship_type {
        Some(typ) => {
            validate_identifier(typ)?;
            format!("MATCH ()-[r:{typ}]->() RETURN count(r) AS count")
        }
        None => "MATCH ()-[r]->() RETURN count(r) AS count".to_string(),
    };

    let count = count(context, &cypher).await?;
    Ok(json!({"relationshipType": args.relationship_type, "count": count}))
}

pub(super) async fn sample_data(context: &ToolContext, arguments: Option<JsonValue>) -> ToolResult {
    let args: SampleArgs = parse_args(arguments)?;

    let limit = args.limit.unwrap_or(SAMPLE_LIMIT_DEFAULT);
    if !(1..=SAMPLE_LIMIT_MAX).contains(&limit) {
        return Err(ToolError::Arguments(format!(
            "limit must be between 1 and {SAMPLE_LIMIT_MAX}, got {limit}"
        )));
    }

    let cypher = match (&args.label, &args.relationship_type) {
        (Some(_), Some(_)) => {
            return Err(ToolError::Arguments(
                "label and relationshipType are mutually exclusive".to_string(),
            ));
        }
        (Some(label), None) => {
            validate_identifier(label)?;
            format!("MATCH (n:{label}) RETURN n LIMIT $limit")
        }
        (None, Some(typ)) => {
            validate_identifier(typ)?;
            format!("MATCH (a)-[r:{typ}]->(b) RETURN a, r, b LIMIT $limit")
        }
        (None, None) => "MATCH (n) RETURN n LIMIT $limit".to_string(),
    };

    let client = context.handle.client().await?;
    let rows = client
        .execute_rows(neo4rs::query(&cypher).param("limit", limit))
        .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let record = convert_row(row)?;
        let object: JsonMap<String, JsonValue> = record
            .iter()
            .map(|(key, value)| (key.clone(), normalize(value)))
            .collect();
        records.push(JsonValue::Object(object));
    }

    Ok(json!({
        "records": records,
        "count": records.len(),
    }))
}
