//! Read-only query classification.
//!
//! Classifies a raw Cypher string as safe or rejected before it ever reaches
//! the driver. There is no Cypher grammar available here, so this is a
//! deny-list / allow-list hybrid over the normalized query text: conservative
//! by construction, over-rejecting rather than under-rejecting. A query
//! containing `create` inside a string literal is rejected; that false
//! positive is the accepted cost of not parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Outcome of classifying a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The query may be sent to the database.
    Safe,
    /// The query must not be executed; `reason` is surfaced to the caller.
    Rejected { reason: String },
}

impl Classification {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

/// Classifier strategy seam.
///
/// The substring-based [`CypherGuard`] is the only implementation today; a
/// grammar-aware validator can replace it later without touching callers.
pub trait QueryClassifier {
    fn classify(&self, query: &str) -> Classification;
}

/// Rule tables for [`CypherGuard`].
///
/// Kept as data rather than control flow so coverage changes are a table
/// edit, reviewable in isolation. The defaults are the canonical rule set.
#[derive(Debug, Clone)]
pub struct GuardRules {
    /// Tokens that mark a query as mutating wherever they appear.
    pub deny_tokens: Vec<&'static str>,
    /// Procedure namespaces a `CALL` may target: schema and meta
    /// introspection plus the graph analytics library.
    pub allowed_call_prefixes: Vec<&'static str>,
    /// Keywords a query may begin with. `CALL` starts are covered by the
    /// procedure allow-list instead.
    pub allowed_starts: Vec<&'static str>,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self {
            deny_tokens: vec![
                "create",
                "delete",
                "detach delete",
                "merge",
                "set",
                "remove",
                "drop",
                "alter",
                "constraint",
                "index",
                "call {",
                "load csv",
                "foreach",
                "with create",
                "with merge",
                "with delete",
                "with set",
                "with remove",
            ],
            allowed_call_prefixes: vec![
                "db.",
                "dbms.",
                "apoc.meta",
                "apoc.schema",
                "apoc.help",
                "gds.",
            ],
            allowed_starts: vec!["match", "return", "with", "unwind", "show"],
        }
    }
}

/// Substring-based read-only guard over Cypher text.
///
/// Deterministic and side-effect-free. The classification order matters: the
/// deny-list short-circuits before the start-keyword check, so an allowed
/// start combined with a later forbidden token is still rejected.
#[derive(Debug, Clone, Default)]
pub struct CypherGuard {
    rules: GuardRules,
}

fn call_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcall\b").expect("valid regex"))
}

fn call_target() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcall\s+([a-z0-9_.]+)").expect("valid regex"))
}

impl CypherGuard {
    pub fn new(rules: GuardRules) -> Self {
        Self { rules }
    }

    /// Check the procedure target of the first `CALL` in the query, if any.
    ///
    /// Returns `None` when the query passes (no call, or an allow-listed
    /// target), otherwise the rejection. A `CALL` whose target cannot be
    /// extracted is rejected; malformed calls never default to allow.
    fn check_call_target(&self, normalized: &str) -> Option<Classification> {
        if !call_marker().is_match(normalized) {
            return None;
        }
        let Some(captures) = call_target().captures(normalized) else {
            return Some(Classification::rejected(
                "malformed procedure call: no procedure name found after CALL",
            ));
        };
        let target = &captures[1];
        if self
            .rules
            .allowed_call_prefixes
            .iter()
            .any(|prefix| target.starts_with(prefix))
        {
            None
        } else {
            Some(Classification::rejected(format!(
                "procedure `{target}` is not on the read-only allow-list"
            )))
        }
    }
}

impl QueryClassifier for CypherGuard {
    fn classify(&self, query: &str) -> Classification {
        let normalized = query.trim().to_lowercase();

        if normalized.is_empty() {
            return Classification::rejected("empty query");
        }

        for token in &self.rules.deny_tokens {
            if normalized.contains(token) {
                return Classification::rejected(format!(
                    "query contains forbidden keyword `{token}`"
                ));
            }
        }

        if let Some(rejection) = self.check_call_target(&normalized) {
            return rejection;
        }

        // A query starting with `call` reaches this point only if its target
        // already passed the procedure allow-list above.
        let allowed_start = normalized.starts_with("call")
            || self
                .rules
                .allowed_starts
                .iter()
                .any(|start| normalized.starts_with(start));
        if !allowed_start {
            return Classification::rejected(
                "query must start with MATCH, RETURN, WITH, UNWIND, SHOW, \
                 or a CALL to an allow-listed procedure",
            );
        }

        Classification::Safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(query: &str) -> Classification {
        CypherGuard::default().classify(query)
    }

    #[test]
    fn simple_read_queries_are_safe() {
        assert!(classify("MATCH (n:Person) RETURN n.name LIMIT 10").is_safe());
        assert!(classify("RETURN 1").is_safe());
        assert!(classify("UNWIND [1, 2, 3] AS x RETURN x").is_safe());
        assert!(classify("WITH 1 AS x RETURN x").is_safe());
        assert!(classify("SHOW DATABASES").is_safe());
    }

    #[test]
    fn mutating_verbs_are_rejected() {
        for query in [
            "CREATE (n:Person {name: 'x'})",
            "MATCH (n) DELETE n",
            "MATCH (n) DETACH DELETE n",
            "MERGE (n:Person {name: 'x'})",
            "MATCH (n) SET n.x = 1",
            "MATCH (n) REMOVE n.x",
            "DROP DATABASE neo4j",
            "ALTER DATABASE neo4j SET ACCESS READ ONLY",
            "LOAD CSV FROM 'file:///x.csv' AS row RETURN row",
            "MATCH (n) FOREACH (x IN [1] | SET n.x = x)",
        ] {
            assert!(!classify(query).is_safe(), "expected rejection: {query}");
        }
    }

    #[test]
    fn deny_list_short_circuits_allowed_start() {
        // Allowed start keyword, forbidden token later.
        assert_eq!(
            classify("MATCH (n) SET n.x=1"),
            Classification::rejected("query contains forbidden keyword `set`")
        );
    }

    #[test]
    fn deny_tokens_match_anywhere_including_literals() {
        // Accepted false positive: `create` inside a string literal.
        assert!(!classify("MATCH (n) WHERE n.name = 'create' RETURN n").is_safe());
        // Accepted false positive: `set` inside a property name.
        assert!(!classify("MATCH (n) RETURN n.offset").is_safe());
    }

    #[test]
    fn case_is_insignificant() {
        assert!(!classify("match (n) DeLeTe n").is_safe());
        assert!(classify("  match (n) return n  ").is_safe());
    }

    #[test]
    fn schema_subqueries_and_ddl_are_rejected() {
        assert!(!classify("CALL { MATCH (n) RETURN n }").is_safe());
        assert!(!classify("SHOW CONSTRAINTS").is_safe());
        assert!(!classify("SHOW INDEXES").is_safe());
    }

    #[test]
    fn introspection_calls_are_safe() {
        assert!(classify("CALL db.labels()").is_safe());
        assert!(classify("CALL db.relationshipTypes()").is_safe());
        assert!(classify("CALL dbms.components() YIELD name RETURN name").is_safe());
        assert!(classify("CALL apoc.meta.stats() YIELD labels RETURN labels").is_safe());
        assert!(classify("CALL gds.graph.list() YIELD graphName RETURN graphName").is_safe());
    }

    #[test]
    fn unlisted_procedures_are_rejected() {
        assert!(!classify("CALL custom.danger()").is_safe());
        assert!(!classify("CALL apoc.load.json('http://x')").is_safe());
        // Mid-query call to an unlisted procedure.
        assert!(!classify("MATCH (n) CALL custom.danger() YIELD x RETURN x").is_safe());
    }

    #[test]
    fn malformed_call_is_rejected_not_allowed() {
        assert_eq!(
            classify("CALL"),
            Classification::rejected(
                "malformed procedure call: no procedure name found after CALL"
            )
        );
    }

    #[test]
    fn unknown_or_missing_start_keyword_is_rejected() {
        assert!(!classify("").is_safe());
        assert!(!classify("   ").is_safe());
        assert!(!classify("FOO RETURN 1").is_safe());
        assert!(!classify("// comment first\nMATCH (n) RETURN n").is_safe());
        assert!(!classify("EXPLAIN MATCH (n) RETURN n").is_safe());
    }

    #[test]
    fn rejection_carries_a_reason() {
        match classify("CREATE (n)") {
            Classification::Rejected { reason } => {
                assert!(reason.contains("create"), "reason was: {reason}");
            }
            Classification::Safe => panic!("expected rejection"),
        }
    }

    #[test]
    fn rules_are_replaceable_data() {
        let mut rules = GuardRules::default();
        rules.deny_tokens.push("terminate");
        let guard = CypherGuard::new(rules);
        assert!(!guard.classify("MATCH (n) RETURN n // terminate").is_safe());
    }
}
