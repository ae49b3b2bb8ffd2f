//! Collaborator store contracts.
//!
//! The pipeline reads findings from a relational store and writes lineage to
//! a property graph. Both are external systems; these traits are the only
//! surface the core depends on. Implementations must honor upsert-by-key
//! semantics on the graph side: syncing the same data twice may never create
//! duplicate nodes or duplicate active edges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::exposure::{ExposureEdge, ExposureFilter};
use crate::types::{Asset, Classification, Finding};

/// Property bag attached to graph nodes.
pub type Properties = Map<String, Value>;

/// System -> Asset ownership relationship (untemporal, idempotent).
pub const REL_SYSTEM_OWNS_ASSET: &str = "SYSTEM_OWNS_ASSET";
/// Asset -> PII-Category temporal exposure relationship.
pub const REL_EXPOSES: &str = "EXPOSES";

/// Store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by collaborator stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend unreachable or not configured.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query or write failed.
    #[error("Store query failed: {0}")]
    Query(String),

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Relational store of assets, findings, and classifications.
///
/// Read-mostly from the pipeline's perspective: findings arrive through the
/// detector's own ingestion path.
#[async_trait]
pub trait FindingStore: Send + Sync {
    /// All known assets.
    async fn list_assets(&self) -> Result<Vec<Asset>>;

    /// Fetch a single asset.
    async fn get_asset(&self, asset_id: Uuid) -> Result<Option<Asset>>;

    /// All findings recorded against an asset.
    async fn list_findings(&self, asset_id: Uuid) -> Result<Vec<Finding>>;

    /// Classifications linked to a finding (usually zero or one).
    async fn get_classifications(&self, finding_id: Uuid) -> Result<Vec<Classification>>;
}

/// Property graph holding the System -> Asset -> PII-Category hierarchy and
/// temporal EXPOSES edges.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Upsert a System node keyed by `id`; properties are merged on conflict.
    async fn upsert_system_node(&self, id: &str, label: &str, props: Properties) -> Result<()>;

    /// Upsert the node representing an asset, keyed by the asset id.
    async fn upsert_asset_node(&self, asset: &Asset) -> Result<()>;

    /// Upsert a PII category node keyed by the category identifier.
    /// Categories are graph-global singletons, not per-asset.
    async fn upsert_category_node(&self, category: &str, props: Properties) -> Result<()>;

    /// Upsert an untemporal relationship; idempotent by (from, to, type).
    async fn upsert_relationship(&self, from_id: &str, to_id: &str, rel_type: &str) -> Result<()>;

    /// Ensure an active EXPOSES edge exists for (asset, category).
    ///
    /// If no active edge exists a fresh one is created with `since = now` and
    /// `first_scan_id = scan_id`; returns `true`. If one exists, only its
    /// `last_scan_id` is refreshed; `since` stays untouched; returns `false`.
    async fn upsert_active_exposure(
        &self,
        asset_id: Uuid,
        category: &str,
        scan_id: &str,
    ) -> Result<bool>;

    /// Close the active exposure window, stamping `until = closed_at`.
    /// Returns whether an active window existed. Remediation is an explicit
    /// administrative action; sync passes never call this.
    async fn close_exposure(
        &self,
        asset_id: Uuid,
        category: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Exposure edges of an asset matching the filter.
    async fn query_exposure_edges(
        &self,
        asset_id: Uuid,
        filter: ExposureFilter,
    ) -> Result<Vec<ExposureEdge>>;
}
