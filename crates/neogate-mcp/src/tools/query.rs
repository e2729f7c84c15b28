//! The generic Cypher query tool.

use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use neogate_core::{normalize, Classification, QueryClassifier};
use neogate_graph::{convert_row, json_to_bolt};

use super::{parse_args, ToolContext, ToolError, ToolResult};

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
    #[serde(default)]
    parameters: Option<JsonMap<String, JsonValue>>,
}

/// Classify, execute, and normalize a caller-supplied query.
///
/// Rejected queries never reach the driver; the shared connection is not
/// even established for them.
pub(super) async fn run_query(context: &ToolContext, arguments: Option<JsonValue>) -> ToolResult {
    let args: QueryArgs = parse_args(arguments)?;

    match context.guard.classify(&args.query) {
        Classification::Safe => {}
        Classification::Rejected { reason } => return Err(ToolError::Rejected(reason)),
    }

    let mut query = neo4rs::query(&args.query);
    if let Some(parameters) = args.parameters {
        for (key, value) in parameters {
            query = query.param(&key, json_to_bolt(value));
        }
    }

    let client = context.handle.client().await?;
    let rows = client.execute_rows(query).await?;

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
