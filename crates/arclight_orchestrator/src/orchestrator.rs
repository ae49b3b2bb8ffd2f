//! Scan-all job orchestration.
//!
//! One scan-all cycle owns the whole job table: starting a new cycle replaces
//! every job from the previous one. The detector runs as a single opaque
//! subprocess for the entire batch, so job state moves in lockstep: all
//! running while the detector runs, then all completed or all failed on exit.

use crate::detector::DetectorConfig;
use crate::error::ScanError;
use arclight_lineage::LineageSynchronizer;
use arclight_protocol::{FindingStore, JobStatus, OverallStatus, ScanAllStatus, ScanJob};
use chrono::Utc;
use std::collections::HashMap;
use std::process::Output;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Job id and display name of the placeholder created when the finding store
/// has no assets yet. The detector discovers assets on its own, so an empty
/// store still gets a full scan cycle under a single synthetic job.
const DISCOVERY_JOB_ID: &str = "global-discovery";
const DISCOVERY_JOB_NAME: &str = "Global Discovery Scan";

/// Progress shown while the detector subprocess is running. The detector
/// reports nothing until it exits, so this is a fixed visual estimate.
const RUNNING_PROGRESS: u8 = 10;

pub struct ScanOrchestrator {
    store: Arc<dyn FindingStore>,
    detector: DetectorConfig,
    lineage: Option<Arc<LineageSynchronizer>>,
    jobs: RwLock<HashMap<String, ScanJob>>,
    current_run: Mutex<Option<JoinHandle<()>>>,
}

impl ScanOrchestrator {
    pub fn new(
        store: Arc<dyn FindingStore>,
        detector: DetectorConfig,
        lineage: Option<Arc<LineageSynchronizer>>,
    ) -> Self {
        Self {
            store,
            detector,
            lineage,
            jobs: RwLock::new(HashMap::new()),
            current_run: Mutex::new(None),
        }
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<String, ScanJob>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<String, ScanJob>> {
        self.jobs.write().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------
    // Scan lifecycle
    // ------------------------------------------------------------------

    /// Start a scan-all cycle: rebuild the job table from the current asset
    /// inventory and launch the detector in the background.
    ///
    /// Returns a status snapshot taken before the background task starts, so
    /// callers see the freshly queued table. The write lock is released
    /// before the task is spawned; `status()` and `jobs()` never block on a
    /// running cycle.
    pub async fn scan_all(self: &Arc<Self>) -> Result<ScanAllStatus, ScanError> {
        let assets = self
            .store
            .list_assets()
            .await
            .map_err(ScanError::UpstreamRead)?;

        let now = Utc::now();
        let mut table = HashMap::new();

        if assets.is_empty() {
            table.insert(
                DISCOVERY_JOB_ID.to_string(),
                ScanJob {
                    id: DISCOVERY_JOB_ID.to_string(),
                    asset_id: None,
                    asset_name: DISCOVERY_JOB_NAME.to_string(),
                    asset_path: "*".to_string(),
                    status: JobStatus::Queued,
                    progress: 0,
                    started_at: now,
                    completed_at: None,
                    error: None,
                },
            );
        } else {
            for asset in &assets {
                let id = Uuid::new_v4().to_string();
                table.insert(
                    id.clone(),
                    ScanJob {
                        id,
                        asset_id: Some(asset.id),
                        asset_name: asset.name.clone(),
                        asset_path: asset.path.clone(),
                        status: JobStatus::Queued,
                        progress: 0,
                        started_at: now,
                        completed_at: None,
                        error: None,
                    },
                );
            }
        }

        info!(jobs = table.len(), "scan-all cycle starting");

        {
            let mut jobs = self.write_jobs();
            *jobs = table;
        }
        let snapshot = self.status();

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_cycle().await });
        *self.current_run.lock().await = Some(handle);

        Ok(snapshot)
    }

    /// Await the in-flight background cycle, if any. The job table is the
    /// public state either way; this only exists so one-shot callers can
    /// block until it settles.
    pub async fn wait_for_scan(&self) {
        let handle = self.current_run.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(%err, "scan cycle task panicked");
            }
        }
    }

    async fn run_cycle(&self) {
        self.mark_all(JobStatus::Running, RUNNING_PROGRESS, None);

        if let Err(err) = self.execute_detector().await {
            warn!(%err, "scan-all cycle failed");
            let msg = match err {
                ScanError::Subprocess(msg) => msg,
                other => other.to_string(),
            };
            self.mark_all_failed(&msg);
            return;
        }

        self.mark_all(JobStatus::Completed, 100, None);
        info!("scan-all cycle completed");

        if let Some(lineage) = &self.lineage {
            match lineage.sync_all().await {
                Ok(report) if report.is_clean() => {
                    info!(synced = report.synced, "post-scan lineage sync completed")
                }
                Ok(report) => warn!(
                    synced = report.synced,
                    failed = report.failed,
                    "post-scan lineage sync finished with failures"
                ),
                Err(err) => warn!(%err, "post-scan lineage sync failed"),
            }
        }
    }

    /// Run the detector to completion. Exit code is the only success signal;
    /// stdout and stderr are logged server-side and never surfaced to jobs.
    async fn execute_detector(&self) -> Result<(), ScanError> {
        let output: Output = self
            .detector
            .command()
            .output()
            .await
            .map_err(|err| {
                error!(program = %self.detector.program.display(), %err, "detector spawn failed");
                ScanError::Subprocess("Failed to start detector process".to_string())
            })?;

        if !output.status.success() {
            error!(
                code = output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "detector exited abnormally"
            );
            return Err(ScanError::Subprocess(
                "Detector process exited with an error".to_string(),
            ));
        }

        Ok(())
    }

    fn mark_all(&self, status: JobStatus, progress: u8, error: Option<&str>) {
        let now = Utc::now();
        let mut jobs = self.write_jobs();
        for job in jobs.values_mut() {
            job.status = status;
            job.progress = progress;
            job.error = error.map(str::to_string);
            job.completed_at = status.is_terminal().then_some(now);
        }
    }

    fn mark_all_failed(&self, message: &str) {
        let now = Utc::now();
        let mut jobs = self.write_jobs();
        for job in jobs.values_mut() {
            job.status = JobStatus::Failed;
            job.error = Some(message.to_string());
            job.completed_at = Some(now);
        }
    }

    // ------------------------------------------------------------------
    // State snapshots
    // ------------------------------------------------------------------

    /// Aggregate view over the job table.
    pub fn status(&self) -> ScanAllStatus {
        let jobs = self.read_jobs();

        let mut status = ScanAllStatus {
            total_jobs: jobs.len(),
            ..Default::default()
        };

        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => status.queued_jobs += 1,
                JobStatus::Running => status.running_jobs += 1,
                JobStatus::Completed => status.completed_jobs += 1,
                JobStatus::Failed => status.failed_jobs += 1,
            }
            status.started_at = match status.started_at {
                Some(earliest) => Some(earliest.min(job.started_at)),
                None => Some(job.started_at),
            };
            if let Some(done) = job.completed_at {
                status.completed_at = match status.completed_at {
                    Some(latest) => Some(latest.max(done)),
                    None => Some(done),
                };
            }
        }

        status.overall_status = if status.total_jobs == 0 {
            OverallStatus::Idle
        } else if status.queued_jobs + status.running_jobs > 0 {
            OverallStatus::Scanning
        } else {
            OverallStatus::Completed
        };

        if status.overall_status != OverallStatus::Completed {
            status.completed_at = None;
        }

        status.progress_percent = if status.total_jobs == 0 {
            0
        } else {
            let pct = (status.completed_jobs * 100 / status.total_jobs) as u8;
            // No real telemetry from the subprocess: show a mid-run estimate.
            if status.running_jobs > 0 && pct < 90 {
                50
            } else {
                pct
            }
        };

        status
    }

    /// Snapshot copy of every job, oldest cycle first, stable within a cycle.
    pub fn jobs(&self) -> Vec<ScanJob> {
        let jobs = self.read_jobs();
        let mut out: Vec<ScanJob> = jobs.values().cloned().collect();
        out.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        out
    }
}
