//! Canonical types and collaborator contracts for Arclight.
//!
//! Every crate in the workspace speaks these types. The relational finding
//! store and the lineage graph store are external collaborators behind the
//! traits in [`store`]; the rest of the pipeline never touches the backing
//! databases directly.

pub mod compliance;
pub mod exposure;
pub mod store;
pub mod types;

pub use exposure::{
    ComplianceEvent, ComplianceEventKind, ExposureEdge, ExposureFilter, ExposureWindow,
};
pub use store::{FindingStore, GraphStore, StoreError};
pub use types::{
    Asset, Classification, Finding, JobStatus, OverallStatus, RiskLevel, ScanAllStatus, ScanJob,
};
