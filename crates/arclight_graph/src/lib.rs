//! Embedded property graph for semantic lineage.
//!
//! Holds the three-level System -> Asset -> PII-Category hierarchy and the
//! temporal EXPOSES edges between assets and categories. All writes are
//! upserts keyed by (label, key); syncing the same data twice leaves the
//! graph byte-identical. The reference deployment kept this graph in Neo4j;
//! [`MemoryGraph`] implements the same `GraphStore` operations in-process,
//! which is also what every test in the workspace runs against.

mod graph;

pub use graph::{MemoryGraph, Node, NodeKey, Relationship};

pub use arclight_protocol::store::{REL_EXPOSES, REL_SYSTEM_OWNS_ASSET};

/// Node label for systems (hosts).
pub const LABEL_SYSTEM: &str = "System";
/// Node label for assets.
pub const LABEL_ASSET: &str = "Asset";
/// Node label for PII categories (graph-global singletons).
pub const LABEL_PII_CATEGORY: &str = "PiiCategory";
