//! Lineage pipeline errors.

use arclight_protocol::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors from lineage synchronization and temporal queries.
///
/// A missing graph store is deliberately NOT represented here: graph sync is
/// an optional capability, and [`crate::LineageSynchronizer`] treats an
/// unconfigured graph as a no-op success rather than a failure.
#[derive(Error, Debug)]
pub enum LineageError {
    /// The relational finding store could not be read. Fatal to the specific
    /// sync operation.
    #[error("Upstream read failed: {0}")]
    UpstreamRead(StoreError),

    /// A graph write or query failed.
    #[error("Graph operation failed: {0}")]
    Graph(StoreError),

    /// The asset to sync does not exist in the finding store.
    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    /// No exposure edge exists for the queried (asset, category) pair.
    #[error("No exposure recorded for asset {asset_id}, category {category}")]
    NoExposure { asset_id: Uuid, category: String },
}
