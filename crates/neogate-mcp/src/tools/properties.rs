//! Property usage analysis with an explicit enriched/degraded two-tier plan.
//!
//! The enriched tier uses `apoc.meta`, which many deployments do not install.
//! When the enriched query fails for any reason, the tool retries with a
//! plain key-sampling query and annotates the response as degraded instead
//! of failing the whole operation. The two tiers are an explicit
//! attempt-then-fallback sequence carrying a typed `degraded` flag, not
//! exception-driven control flow.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use neogate_core::validate_identifier;
use neogate_graph::{GraphClient, GraphError};

use super::{parse_args, ToolContext, ToolResult};

const SAMPLE_DEFAULT: i64 = 1000;

/// How often one property name was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyCount {
    pub name: String,
    pub count: i64,
}

/// Outcome of a property analysis, including which tier produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAnalysis {
    pub properties: Vec<PropertyCount>,
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
struct NodePropertiesArgs {
    label: String,
    #[serde(default, rename = "sampleSize")]
    sample_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RelationshipPropertiesArgs {
    #[serde(rename = "relationshipType")]
    relationship_type: String,
    #[serde(default, rename = "sampleSize")]
    sample_size: Option<i64>,
}

/// Descending frequency, ties broken alphabetically by name.
fn sort_property_counts(counts: &mut [PropertyCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
}

async fn collect_counts(
    client: &GraphClient,
    query: neo4rs::Query,
) -> Result<Vec<PropertyCount>, GraphError> {
    let rows = client.execute_rows(query).await?;
    let mut counts = Vec::with_capacity(rows.len());
    for row in rows {
        // apoc yields a null propertyName for entities without properties.
        let Ok(name) = row.get::<String>("name") else {
            continue;
        };
        let count = row.get::<i64>("count").unwrap_or(0);
        counts.push(PropertyCount { name, count });
    }
    sort_property_counts(&mut counts);
    Ok(counts)
}

async fn analyze(
    client: &GraphClient,
    enriched: neo4rs::Query,
    fallback: neo4rs::Query,
) -> Result<PropertyAnalysis, GraphError> {
    match collect_counts(client, enriched).await {
        Ok(properties) => Ok(PropertyAnalysis {
            properties,
            degraded: false,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "enriched property analysis unavailable, falling back");
            let properties = collect_counts(client, fallback).await?;
            Ok(PropertyAnalysis {
                properties,
                degraded: true,
            })
        }
    }
}

fn render_analysis(
    subject_key: &str,
    subject: &str,
    sample: i64,
    analysis: &PropertyAnalysis,
) -> JsonValue {
    let mut payload = serde_json::Map::new();
    payload.insert(subject_key.to_string(), json!(subject));
    payload.insert("sampleSize".to_string(), json!(sample));
    payload.insert("degraded".to_string(), json!(analysis.degraded));
    payload.insert("properties".to_string(), json!(analysis.properties));
    if analysis.degraded {
        payload.insert(
            "note".to_string(),
            json!("apoc.meta procedures unavailable; counts derived from sampled property keys only"),
        );
    }
    JsonValue::Object(payload)
}

fn sample_size(requested: Option<i64>) -> i64 {
    requested.filter(|&s| s > 0).unwrap_or(SAMPLE_DEFAULT)
}

pub(super) async fn node_properties(
    context: &ToolContext,
    arguments: Option<JsonValue>,
) -> ToolResult {
    let args: NodePropertiesArgs = parse_args(arguments)?;
    validate_identifier(&args.label)?;
    let sample = sample_size(args.sample_size);

    let enriched = neo4rs::query(
        "CALL apoc.meta.nodeTypeProperties({includeLabels: [$label], sample: $sample}) \
         YIELD propertyName, propertyObservations \
         RETURN propertyName AS name, propertyObservations AS count",
    )
    .param("label", args.label.as_str())
    .param("sample", sample);

    let fallback = neo4rs::query(&format!(
        "MATCH (n:{label}) WITH n LIMIT $sample \
         UNWIND keys(n) AS key \
         RETURN key AS name, count(*) AS count",
        label = args.label
    ))
    .param("sample", sample);

    let client = context.handle.client().await?;
    let analysis = analyze(client, enriched, fallback).await?;
    Ok(render_analysis("label", &args.label, sample, &analysis))
}

pub(super) async fn relationship_properties(
    context: &ToolContext,
    arguments: Option<JsonValue>,
) -> ToolResult {
    let args: RelationshipPropertiesArgs = parse_args(arguments)?;
    validate_identifier(&args.relationship_type)?;
    let sample = sample_size(args.sample_size);

    let enriched = neo4rs::query(
        "CALL apoc.meta.relTypeProperties({includeRels: [$relType], sample: $sample}) \
         YIELD propertyName, propertyObservations \
         RETURN propertyName AS name, propertyObservations AS count",
    )
    .param("relType", args.relationship_type.as_str())
    .param("sample", sample);

    let fallback = neo4rs::query(&format!(
        "MATCH ()-[r:{typ}]->() WITH r LIMIT $sample \
         UNWIND keys(r) AS key \
         RETURN key AS name, count(*) AS count",
        typ = args.relationship_type
    ))
    .param("sample", sample);

    let client = context.handle.client().await?;
    let analysis = analyze(client, enriched, fallback).await?;
    Ok(render_analysis(
        "relationshipType",
        &args.relationship_type,
        sample,
        &analysis,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn counts(pairs: &[(&str, i64)]) -> Vec<PropertyCount> {
        pairs
            .iter()
            .map(|(name, count)| PropertyCount {
                name: name.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn ordering_is_descending_count_then_name() {
        let mut properties = counts(&[("name", 3), ("age", 3), ("zip", 10), ("email", 1)]);
        sort_property_counts(&mut properties);
        assert_eq!(
            properties,
            counts(&[("zip", 10), ("age", 3), ("name", 3), ("email", 1)])
        );
    }

    #[test]
    fn degraded_payload_carries_note_and_flag() {
        let analysis = PropertyAnalysis {
            properties: counts(&[("name", 5)]),
            degraded: true,
        };
        let payload = render_analysis("label", "Person", 1000, &analysis);
        assert_eq!(payload["degraded"], json!(true));
        assert_eq!(payload["label"], json!("Person"));
        assert!(payload["note"].as_str().unwrap().contains("apoc.meta"));
        assert_eq!(payload["properties"][0]["name"], json!("name"));
        assert_eq!(payload["properties"][0]["count"], json!(5));
    }

    #[test]
    fn enriched_payload_has_no_note() {
        let analysis = PropertyAnalysis {
            properties: counts(&[("name", 5)]),
            degraded: false,
        };
        let payload = render_analysis("label", "Person", 1000, &analysis);
        assert_eq!(payload["degraded"], json!(false));
        assert!(payload.get("note").is_none());
    }

    #[test]
    fn sample_size_defaults_and_rejects_nonpositive() {
        assert_eq!(sample_size(None), SAMPLE_DEFAULT);
        assert_eq!(sample_size(Some(0)), SAMPLE_DEFAULT);
        assert_eq!(sample_size(Some(-5)), SAMPLE_DEFAULT);
        assert_eq!(sample_size(Some(25)), 25);
    }
}
