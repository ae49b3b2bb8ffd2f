//! Semantic lineage pipeline.
//!
//! Transforms the relational stream of findings into the three-level
//! System -> Asset -> PII-Category hierarchy in the graph store:
//!
//! - [`aggregate`]: roll a scan's findings into per-category aggregates,
//!   filtering noise below the confidence floor.
//! - [`risk_level_for`]: table-driven risk classification per category.
//! - [`LineageSynchronizer`]: idempotent upsert of the hierarchy and its
//!   temporal EXPOSES edges.
//! - [`TemporalExposureTracker`]: point-in-time and compliance queries over
//!   exposure windows.

mod aggregate;
mod error;
mod risk;
mod sync;
mod temporal;

pub use aggregate::{aggregate, AggregationStats, CategoryAggregate, MIN_CLASSIFICATION_CONFIDENCE};
pub use error::LineageError;
pub use risk::risk_level_for;
pub use sync::{LineageSynchronizer, SyncReport};
pub use temporal::TemporalExposureTracker;
