//! Scan orchestration.
//!
//! [`ScanOrchestrator`] drives scan-all cycles over the asset inventory: it
//! rebuilds an in-memory job table, runs the opaque detector subprocess in a
//! background task, moves every job through queued -> running -> terminal in
//! lockstep, and on success triggers a lineage sync pass. Callers poll
//! [`ScanOrchestrator::status`] and [`ScanOrchestrator::jobs`] for snapshots.

mod detector;
mod error;
mod orchestrator;

pub use detector::DetectorConfig;
pub use error::ScanError;
pub use orchestrator::ScanOrchestrator;
