//! Schema and server introspection tools.

use serde_json::{json, Value as JsonValue};

use neogate_core::normalize;
use neogate_graph::{convert_row, GraphClient, GraphError};

use super::{ToolContext, ToolResult};

/// Run an introspection call and collect one string column.
async fn string_column(
    client: &GraphClient,
    cypher: &str,
    column: &str,
) -> Result<Vec<String>, GraphError> {
    let rows = client.execute_rows(neo4rs::query(cypher)).await?;
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let value: String = row
            .get(column)
            .map_err(|e| GraphError::Conversion(e.to_string()))?;
        values.push(value);
    }
    Ok(values)
}

async fn fetch_labels(client: &GraphClient) -> Result<Vec<String>, GraphError> {
    string_column(
        client,
        "CALL db.labels() YIELD label RETURN label ORDER BY label",
        "label",
    )
    .await
}

async fn fetch_relationship_types(client: &GraphClient) -> Result<Vec<String>, GraphError> {
    string_column(
        client,
        "CALL db.relationshipTypes() YIELD relationshipType \
         RETURN relationshipType ORDER BY relationshipType",
        "relationshipType",
    )
    .await
}

async fn fetch_property_keys(client: &GraphClient) -> Result<Vec<String>, GraphError> {
    string_column(
        client,
        "CALL db.propertyKeys() YIELD propertyKey RETURN propertyKey ORDER BY propertyKey",
        "propertyKey",
    )
    .await
}

pub(super) async fn labels(context: &ToolContext) -> ToolResult {
    let client = context.handle.client().await?;
    let labels = fetch_labels(client).await?;
    Ok(json!({"labels": labels, "count": labels.len()}))
}

pub(super) async fn relationship_types(context: &ToolContext) -> ToolResult {
    let client = context.handle.client().await?;
    let types = fetch_relationship_types(client).await?;
    Ok(json!({"relationshipTypes": types, "count": types.len()}))
}

pub(super) async fn property_keys(context: &ToolContext) -> ToolResult {
    let client = context.handle.client().await?;
    let keys = fetch_property_keys(client).await?;
    Ok(json!({"propertyKeys": keys, "count": keys.len()}))
}

/// All three schema dimensions in one response.
pub(super) async fn schema_overview(context: &ToolContext) -> ToolResult {
    let client = context.handle.client().await?;
    let labels = fetch_labels(client).await?;
    let relationship_types = fetch_relationship_types(client).await?;
    let property_keys = fetch_property_keys(client).await?;

    Ok(json!({
        "labels": labels,
        "relationshipTypes": relationship_types,
        "propertyKeys": property_keys,
    }))
}

pub(super) async fn database_info(context: &ToolContext) -> ToolResult {
    let client = context.handle.client().await?;
    let rows = client
        .execute_rows(neo4rs::query(
            "CALL dbms.components() YIELD name, versions, edition \
             RETURN name, versions, edition",
        ))
        .await?;

    let mut components = Vec::with_capacity(rows.len());
    for row in &rows {
        let record = convert_row(row)?;
        let object: serde_json::Map<String, JsonValue> = record
            .iter()
            .map(|(key, value)| (key.clone(), normalize(value)))
            .collect();
        components.push(JsonValue::Object(object));
    }

    Ok(json!({"components": components}))
}
