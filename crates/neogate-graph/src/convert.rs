//! Conversion between driver result rows and the [`GraphValue`] model,
//! and between JSON tool arguments and driver parameter values.

use std::collections::BTreeMap;

use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltType, Row};
use serde_json::Value as JsonValue;

use neogate_core::{GraphNode, GraphPath, GraphRelationship, GraphValue};

use crate::client::GraphError;

/// Convert one result row into a map of column name to graph value.
///
/// Column names come from deserializing the row into a JSON map. Graph
/// entities flatten to bare property maps under that deserialization, so
/// each column is then re-tried against the driver's typed wrappers (node,
/// relationship, path, and homogeneous lists of either); the typed form wins
/// so identity and labels survive. Columns with no graph structure keep
/// their plain JSON shape.
pub fn convert_row(row: &Row) -> Result<BTreeMap<String, GraphValue>, GraphError> {
    let plain: BTreeMap<String, JsonValue> = row
        .to()
        .map_err(|e| GraphError::Conversion(format!("failed to read result row: {e}")))?;

    let mut record = BTreeMap::new();
    for (key, fallback) in plain {
        let value = convert_column(row, &key, fallback);
        record.insert(key, value);
    }
    Ok(record)
}

fn convert_column(row: &Row, key: &str, fallback: JsonValue) -> GraphValue {
    if let Ok(node) = row.get::<neo4rs::Node>(key) {
        return GraphValue::Node(convert_node(&node));
    }
    if let Ok(rel) = row.get::<neo4rs::Relation>(key) {
        return GraphValue::Relationship(convert_relation(&rel));
    }
    if let Ok(path) = row.get::<neo4rs::Path>(key) {
        return GraphValue::Path(convert_path(&path));
    }
    // collect(n) / collect(r) come back as lists of entities. An empty list
    // matches both typed extractions, so it falls through to the JSON shape.
    if let Ok(nodes) = row.get::<Vec<neo4rs::Node>>(key) {
        if !nodes.is_empty() {
            return GraphValue::List(
                nodes
                    .iter()
                    .map(|n| GraphValue::Node(convert_node(n)))
                    .collect(),
            );
        }
    }
    if let Ok(rels) = row.get::<Vec<neo4rs::Relation>>(key) {
        if !rels.is_empty() {
            return GraphValue::List(
                rels.iter()
                    .map(|r| GraphValue::Relationship(convert_relation(r)))
                    .collect(),
            );
        }
    }
    GraphValue::from_json(fallback)
}

fn convert_properties<'a, I>(keys: I, get: impl Fn(&str) -> Option<JsonValue>) -> BTreeMap<String, GraphValue>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .map(|key| {
            let value = get(key)
                .map(GraphValue::from_json)
                // Property types with no JSON shape (temporal, spatial) are
                // not representable at this layer.
                .unwrap_or(GraphValue::Null);
            (key.to_string(), value)
        })
        .collect()
}

pub(crate) fn convert_node(node: &neo4rs::Node) -> GraphNode {
    GraphNode {
        identity: node.id(),
        labels: node.labels().iter().map(|l| l.to_string()).collect(),
        properties: convert_properties(node.keys(), |key| node.get::<JsonValue>(key).ok()),
    }
}

pub(crate) fn convert_relation(rel: &neo4rs::Relation) -> GraphRelationship {
    GraphRelationship {
        identity: rel.id(),
        start: rel.start_node_id(),
        end: rel.end_node_id(),
        typ: rel.typ().to_string(),
        properties: convert_properties(rel.keys(), |key| rel.get::<JsonValue>(key).ok()),
    }
}

pub(crate) fn convert_path(path: &neo4rs::Path) -> GraphPath {
    let nodes: Vec<GraphNode> = path.nodes().iter().map(convert_node).collect();
    // Path relationships come back without start/end ids; segment i runs from
    // nodes[i] to nodes[i+1], and the driver guarantees one more node than
    // relationships.
    let relationships = path
        .rels()
        .iter()
        .enumerate()
        .map(|(i, rel)| GraphRelationship {
            identity: rel.id(),
            start: nodes.get(i).map(|n| n.identity).unwrap_or_default(),
            end: nodes.get(i + 1).map(|n| n.identity).unwrap_or_default(),
            typ: rel.typ().to_string(),
            properties: convert_properties(rel.keys(), |key| rel.get::<JsonValue>(key).ok()),
        })
        .collect();
    GraphPath {
        nodes,
        relationships,
    }
}

/// Convert a JSON tool argument into a driver parameter value.
///
/// Numbers prefer the integer representation; integral values outside the
/// i64 range degrade to floats.
pub fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                BoltType::Integer(BoltInteger::new(i))
            } else {
                BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        JsonValue::String(s) => BoltType::String(s.into()),
        JsonValue::Array(items) => {
            let values: Vec<BoltType> = items.into_iter().map(json_to_bolt).collect();
            BoltType::List(BoltList::from(values))
        }
        JsonValue::Object(map) => {
            let mut bolt = BoltMap::default();
            for (key, value) in map {
                bolt.put(key.into(), json_to_bolt(value));
            }
            BoltType::Map(bolt)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_map_to_matching_bolt_variants() {
        assert!(matches!(json_to_bolt(json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(json!(true)), BoltType::Boolean(_)));
        assert!(matches!(json_to_bolt(json!(42)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(json!(1.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(json!("x")), BoltType::String(_)));
    }

    #[test]
    fn collections_recurse() {
        assert!(matches!(
            json_to_bolt(json!([1, "two", null])),
            BoltType::List(_)
        ));
        assert!(matches!(
            json_to_bolt(json!({"k": [true]})),
            BoltType::Map(_)
        ));
    }

    #[test]
    fn integral_numbers_stay_integers() {
        let BoltType::Integer(i) = json_to_bolt(json!(7)) else {
            panic!("expected integer");
        };
        assert_eq!(i.value, 7);
    }
}
