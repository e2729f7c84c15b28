//! The graph value model.
//!
//! [`GraphValue`] is a closed tagged union over everything a Cypher query can
//! return: scalars, nodes, relationships, paths, and nested collections.
//! Keeping it closed (rather than passing driver types around) makes the
//! normalizer's recursion exhaustive at compile time and keeps this crate
//! free of the driver dependency. Values are transient: produced per result
//! record, normalized once, discarded.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// A node returned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub identity: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, GraphValue>,
}

/// A relationship returned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRelationship {
    pub identity: i64,
    pub start: i64,
    pub end: i64,
    pub typ: String,
    pub properties: BTreeMap<String, GraphValue>,
}

/// A path returned by the database: `nodes` has exactly one more element
/// than `relationships`, and segment `i` connects `nodes[i]` to
/// `nodes[i + 1]` via `relationships[i]`. Paths are acyclic by construction
/// in the source domain.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

/// Any value a result record can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Node(GraphNode),
    Relationship(GraphRelationship),
    Path(GraphPath),
    List(Vec<GraphValue>),
    Map(BTreeMap<String, GraphValue>),
}

impl GraphValue {
    /// Lift a plain JSON value into the union. Used for result columns that
    /// carry no graph structure (scalars, plain lists and maps).
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            JsonValue::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for GraphValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for GraphValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_scalars() {
        assert_eq!(GraphValue::from_json(json!(null)), GraphValue::Null);
        assert_eq!(GraphValue::from_json(json!(true)), GraphValue::Bool(true));
        assert_eq!(GraphValue::from_json(json!(42)), GraphValue::Int(42));
        assert_eq!(GraphValue::from_json(json!(1.5)), GraphValue::Float(1.5));
        assert_eq!(
            GraphValue::from_json(json!("ok")),
            GraphValue::String("ok".to_string())
        );
    }

    #[test]
    fn from_json_recurses_into_collections() {
        let value = GraphValue::from_json(json!({"xs": [1, "two", null]}));
        let GraphValue::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(
            map.get("xs"),
            Some(&GraphValue::List(vec![
                GraphValue::Int(1),
                GraphValue::from("two"),
                GraphValue::Null,
            ]))
        );
    }
}
