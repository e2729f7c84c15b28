//! Result normalization.
//!
//! Converts a [`GraphValue`] tree into plain JSON for the tool response.
//! Total over the union: never fails for a well-formed value. Depth-recursive
//! with no explicit bound; result trees are finite and shallow in practice
//! because queries carry a `LIMIT` and paths are acyclic.
//!
//! Integers map to JSON numbers as `i64`. Consumers that read JSON numbers
//! as doubles lose precision above 2^53; that is a deliberate simplification
//! inherited from the response format, not silent corruption here.

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::value::{GraphNode, GraphPath, GraphRelationship, GraphValue};

/// Normalize one graph value into its JSON representation.
pub fn normalize(value: &GraphValue) -> JsonValue {
    match value {
        GraphValue::Null => JsonValue::Null,
        GraphValue::Bool(b) => JsonValue::Bool(*b),
        GraphValue::Int(i) => json!(i),
        // Non-finite floats have no JSON representation; map them to null
        // rather than fail.
        GraphValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        GraphValue::String(s) => JsonValue::String(s.clone()),
        GraphValue::Node(node) => normalize_node(node),
        GraphValue::Relationship(rel) => normalize_relationship(rel),
        GraphValue::Path(path) => normalize_path(path),
        GraphValue::List(items) => JsonValue::Array(items.iter().map(normalize).collect()),
        GraphValue::Map(map) => JsonValue::Object(normalize_properties(map)),
    }
}

fn normalize_properties(
    properties: &std::collections::BTreeMap<String, GraphValue>,
) -> JsonMap<String, JsonValue> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), normalize(value)))
        .collect()
}

fn normalize_node(node: &GraphNode) -> JsonValue {
    json!({
        "identity": node.identity,
        "labels": node.labels,
        "properties": normalize_properties(&node.properties),
    })
}

fn normalize_relationship(rel: &GraphRelationship) -> JsonValue {
    json!({
        "identity": rel.identity,
        "start": rel.start,
        "end": rel.end,
        "type": rel.typ,
        "properties": normalize_properties(&rel.properties),
    })
}

fn normalize_path(path: &GraphPath) -> JsonValue {
    let segments: Vec<JsonValue> = path
        .relationships
        .iter()
        .enumerate()
        .filter_map(|(i, rel)| {
            let start = path.nodes.get(i)?;
            let end = path.nodes.get(i + 1)?;
            Some(json!({
                "start": normalize_node(start),
                "relationship": normalize_relationship(rel),
                "end": normalize_node(end),
            }))
        })
        .collect();

    json!({
        "start": path.nodes.first().map(normalize_node).unwrap_or(JsonValue::Null),
        "end": path.nodes.last().map(normalize_node).unwrap_or(JsonValue::Null),
        "segments": segments,
    })
}
