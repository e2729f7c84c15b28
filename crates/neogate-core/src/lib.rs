//! neogate-core: pure logic for the Neogate read-only Neo4j gateway.
//!
//! This crate holds the two components every request flows through:
//! - The query guard, a static classifier that decides whether a Cypher
//!   string is allowed to reach the database at all.
//! - The result normalizer, which flattens graph result values (nodes,
//!   relationships, paths, collections) into plain JSON.
//!
//! Nothing here performs I/O or depends on the database driver, so both
//! components are testable without a running Neo4j instance.

pub mod guard;
pub mod ident;
pub mod normalize;
pub mod value;

pub use guard::{Classification, CypherGuard, GuardRules, QueryClassifier};
pub use ident::{validate_identifier, IdentError};
pub use normalize::normalize;
pub use value::{GraphNode, GraphPath, GraphRelationship, GraphValue};
