//! Orchestrator error types.

use arclight_protocol::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The finding store could not be read when building the job table.
    #[error("failed to read assets from the finding store: {0}")]
    UpstreamRead(StoreError),

    /// The detector subprocess could not be started or exited abnormally.
    /// Failures are batch-wide: the detector is opaque and reports no
    /// per-asset progress, so one bad run fails every job in the cycle.
    #[error("detector subprocess failed: {0}")]
    Subprocess(String),
}
