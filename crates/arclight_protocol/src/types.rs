//! Domain entities and canonical enums.
//!
//! Enum string forms are part of the external contract (they appear in the
//! relational store and in graph node properties), so every enum carries
//! `as_str`/`FromStr` alongside its serde derives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Relational entities
// ============================================================================

/// A discovered data asset (file, table, bucket, ...) registered for scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    /// Stable identifier that survives re-discovery (path hash in practice).
    pub stable_id: String,
    pub name: String,
    pub path: String,
    pub asset_type: String,
    /// Host the asset lives on; also the key of the owning System node.
    pub host: String,
    pub environment: String,
    pub owner: String,
    pub source_system: String,
    pub total_findings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A raw detector finding. Read-only to the pipeline; the detector's
/// ingestion path owns writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub pattern_name: String,
    /// Matched values (masked upstream before they reach the store).
    pub matches: Vec<String>,
    pub severity: String,
    pub created_at: DateTime<Utc>,
}

impl Finding {
    /// Number of individual matches this finding carries.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Verified PII classification attached to a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub id: Uuid,
    pub finding_id: Uuid,
    pub classification_type: String,
    /// Specific PII category identifier, e.g. "IN_AADHAAR" or "CREDIT_CARD".
    pub sub_category: String,
    pub confidence_score: f64,
    /// DPDPA legal category tag, empty when the classifier did not map one.
    pub dpdpa_category: String,
    pub requires_consent: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Scan job lifecycle
// ============================================================================

/// Lifecycle of one scan job. Transitions are monotonic:
/// `Queued -> Running -> {Completed, Failed}` within one scan-all cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: '{}'", s)),
        }
    }
}

/// One scan job per asset per scan-all invocation. Owned exclusively by the
/// orchestrator; callers only ever see snapshot copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: String,
    /// None for the synthetic discovery placeholder job.
    pub asset_id: Option<Uuid>,
    pub asset_name: String,
    pub asset_path: String,
    pub status: JobStatus,
    pub progress: u8,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Overall state of a scan-all cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Idle,
    Scanning,
    Completed,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Idle => "idle",
            OverallStatus::Scanning => "scanning",
            OverallStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate view over the orchestrator's job table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanAllStatus {
    pub total_jobs: usize,
    pub queued_jobs: usize,
    pub running_jobs: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
    pub overall_status: OverallStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percent: u8,
}

// ============================================================================
// Risk
// ============================================================================

/// Risk level attached to a PII category node. Derived from the category's
/// baseline severity and the aggregate detection confidence; deliberately
/// table-driven so the mapping stays auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Clamp an integer severity score into a level: `<= 0` is Low, `>= 3`
    /// is Critical.
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            2 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(format!("Invalid risk level: '{}'", s)),
        }
    }
}
