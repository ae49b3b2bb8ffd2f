//! Temporal queries over exposure windows.

use crate::error::LineageError;
use arclight_protocol::{
    ComplianceEvent, ComplianceEventKind, ExposureEdge, ExposureFilter, ExposureWindow, GraphStore,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only query layer over EXPOSES edges.
///
/// "Compliant" below means "had zero active PII exposure", a narrow
/// operational definition rather than a legal judgment.
pub struct TemporalExposureTracker {
    graph: Arc<dyn GraphStore>,
}

impl TemporalExposureTracker {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    /// All PII categories the asset was exposing at instant `t`.
    pub async fn exposure_at_time(
        &self,
        asset_id: Uuid,
        t: DateTime<Utc>,
    ) -> Result<Vec<ExposureEdge>, LineageError> {
        self.graph
            .query_exposure_edges(asset_id, ExposureFilter::at(t))
            .await
            .map_err(LineageError::Graph)
    }

    /// Currently open exposure windows for the asset.
    pub async fn active_exposures(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<ExposureEdge>, LineageError> {
        self.graph
            .query_exposure_edges(asset_id, ExposureFilter::active())
            .await
            .map_err(LineageError::Graph)
    }

    /// Complete exposure history for the asset, newest window first.
    pub async fn exposure_history(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<ExposureWindow>, LineageError> {
        let mut edges = self
            .graph
            .query_exposure_edges(asset_id, ExposureFilter::default())
            .await
            .map_err(LineageError::Graph)?;
        edges.sort_by(|a, b| b.since.cmp(&a.since));
        Ok(edges.into_iter().map(ExposureWindow::from).collect())
    }

    /// How long the asset has (or had) been exposing a category, measured on
    /// the most recent window: `(until ?? now) - since`.
    pub async fn exposure_duration(
        &self,
        asset_id: Uuid,
        category: &str,
    ) -> Result<Duration, LineageError> {
        let edges = self
            .graph
            .query_exposure_edges(asset_id, ExposureFilter::for_category(category))
            .await
            .map_err(LineageError::Graph)?;

        let latest = edges
            .into_iter()
            .max_by_key(|e| e.since)
            .ok_or_else(|| LineageError::NoExposure {
                asset_id,
                category: category.to_string(),
            })?;

        let end = latest.until.unwrap_or_else(Utc::now);
        Ok(end - latest.since)
    }

    /// Timeline of window boundaries: one EXPOSURE_STARTED event per edge
    /// plus one EXPOSURE_ENDED per closed edge, ascending by time.
    pub async fn compliance_timeline(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<ComplianceEvent>, LineageError> {
        let edges = self
            .graph
            .query_exposure_edges(asset_id, ExposureFilter::default())
            .await
            .map_err(LineageError::Graph)?;

        let mut events = Vec::with_capacity(edges.len() * 2);
        for edge in edges {
            events.push(ComplianceEvent {
                event_time: edge.since,
                kind: ComplianceEventKind::ExposureStarted,
                category: edge.category.clone(),
            });
            if let Some(until) = edge.until {
                events.push(ComplianceEvent {
                    event_time: until,
                    kind: ComplianceEventKind::ExposureEnded,
                    category: edge.category,
                });
            }
        }
        events.sort_by_key(|e| e.event_time);
        Ok(events)
    }

    /// True iff the asset had no active exposure at instant `t`.
    pub async fn was_compliant_at(
        &self,
        asset_id: Uuid,
        t: DateTime<Utc>,
    ) -> Result<bool, LineageError> {
        Ok(self.exposure_at_time(asset_id, t).await?.is_empty())
    }
}
