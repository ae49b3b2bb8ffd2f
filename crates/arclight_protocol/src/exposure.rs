//! Temporal exposure types.
//!
//! An EXPOSES edge records the window during which an asset actively
//! contained a PII category. The invariant upheld by every graph backend:
//! for a given (asset, category) pair at most one edge has `until = None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One EXPOSES edge between an asset and a PII category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureEdge {
    pub asset_id: Uuid,
    pub category: String,
    /// Start of the exposure window. Set once, on edge creation; a re-scan
    /// that still observes the category must never move it.
    pub since: DateTime<Utc>,
    /// End of the exposure window. `None` while exposure is active.
    pub until: Option<DateTime<Utc>>,
    /// Scan that first observed this exposure.
    pub first_scan_id: String,
    /// Most recent scan that still observed this exposure.
    pub last_scan_id: String,
}

impl ExposureEdge {
    pub fn is_active(&self) -> bool {
        self.until.is_none()
    }

    /// Whether the window covers instant `t`: `since <= t` and the window
    /// either never closed or closed strictly after `t`.
    pub fn covers(&self, t: DateTime<Utc>) -> bool {
        self.since <= t && self.until.map_or(true, |until| until > t)
    }
}

/// Filter for exposure edge queries. Default matches every edge of an asset.
#[derive(Debug, Clone, Default)]
pub struct ExposureFilter {
    /// Only edges with `until = None`.
    pub active_only: bool,
    /// Only edges whose window covers this instant.
    pub at_time: Option<DateTime<Utc>>,
    /// Only edges to this category.
    pub category: Option<String>,
}

impl ExposureFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn at(t: DateTime<Utc>) -> Self {
        Self {
            at_time: Some(t),
            ..Self::default()
        }
    }

    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, edge: &ExposureEdge) -> bool {
        if self.active_only && !edge.is_active() {
            return false;
        }
        if let Some(t) = self.at_time {
            if !edge.covers(t) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if edge.category != *category {
                return false;
            }
        }
        true
    }
}

/// One complete exposure window in an asset's history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureWindow {
    pub category: String,
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
    pub first_scan_id: String,
    pub last_scan_id: String,
    pub is_active: bool,
}

impl From<ExposureEdge> for ExposureWindow {
    fn from(edge: ExposureEdge) -> Self {
        Self {
            is_active: edge.is_active(),
            category: edge.category,
            since: edge.since,
            until: edge.until,
            first_scan_id: edge.first_scan_id,
            last_scan_id: edge.last_scan_id,
        }
    }
}

/// Kind of compliance timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceEventKind {
    ExposureStarted,
    ExposureEnded,
}

impl ComplianceEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceEventKind::ExposureStarted => "EXPOSURE_STARTED",
            ComplianceEventKind::ExposureEnded => "EXPOSURE_ENDED",
        }
    }
}

/// A change in an asset's compliance posture: one event per window boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub event_time: DateTime<Utc>,
    pub kind: ComplianceEventKind,
    pub category: String,
}
