//! neogate-graph: Neo4j access for the Neogate gateway.
//!
//! All database traffic flows through [`GraphClient`]. The shared
//! [`ConnectionHandle`] owns the lazily-established client for the process
//! lifetime; [`convert`] turns driver rows into the crate-neutral
//! [`neogate_core::GraphValue`] model consumed by the normalizer.

pub mod client;
pub mod convert;

pub use client::{ConnectionHandle, GraphClient, GraphConfig, GraphError};
pub use convert::{convert_row, json_to_bolt};
