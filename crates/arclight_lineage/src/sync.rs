//! Lineage synchronization: relational findings -> graph hierarchy.

use crate::aggregate::{aggregate, CategoryAggregate};
use crate::error::LineageError;
use crate::risk::risk_level_for;
use arclight_protocol::store::{Properties, REL_SYSTEM_OWNS_ASSET};
use arclight_protocol::{FindingStore, GraphStore};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one `sync_all` pass. Per-asset failures are isolated and
/// reported here in aggregate, never as a batch-wide error.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub total_assets: usize,
    pub synced: usize,
    pub failed: usize,
    pub errors: Vec<(Uuid, String)>,
    /// The scan id stamped on exposure edges during this pass.
    pub scan_id: String,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Idempotently mirrors the finding store's state into the graph store as a
/// System -> Asset -> PII-Category hierarchy with temporal exposure edges.
///
/// The graph store is optional: when absent, every sync is a no-op success.
/// Graph sync is a derived view that can be re-driven from the relational
/// source of truth at any time, so a missing or unreachable graph must never
/// be treated as a pipeline failure.
pub struct LineageSynchronizer {
    findings: Arc<dyn FindingStore>,
    graph: Option<Arc<dyn GraphStore>>,
}

impl LineageSynchronizer {
    pub fn new(findings: Arc<dyn FindingStore>, graph: Option<Arc<dyn GraphStore>>) -> Self {
        Self { findings, graph }
    }

    pub fn graph_configured(&self) -> bool {
        self.graph.is_some()
    }

    /// Sync one asset under a fresh scan id.
    pub async fn sync_asset(&self, asset_id: Uuid) -> Result<(), LineageError> {
        self.sync_asset_for_scan(asset_id, &Uuid::new_v4().to_string())
            .await
    }

    /// Sync one asset, stamping `scan_id` on exposure edges.
    ///
    /// Re-running with the same scan id and unchanged findings leaves every
    /// node and edge property set byte-identical.
    pub async fn sync_asset_for_scan(
        &self,
        asset_id: Uuid,
        scan_id: &str,
    ) -> Result<(), LineageError> {
        let Some(graph) = self.graph.as_ref() else {
            debug!(%asset_id, "graph store not configured, skipping lineage sync");
            return Ok(());
        };

        let asset = self
            .findings
            .get_asset(asset_id)
            .await
            .map_err(LineageError::UpstreamRead)?
            .ok_or(LineageError::AssetNotFound(asset_id))?;

        // System node, keyed by host.
        let system_id = format!("system-{}", asset.host);
        let mut system_props = Properties::new();
        system_props.insert("host".into(), json!(asset.host));
        system_props.insert("source_system".into(), json!(asset.source_system));
        system_props.insert("environment".into(), json!(asset.environment));
        graph
            .upsert_system_node(&system_id, &asset.host, system_props)
            .await
            .map_err(LineageError::Graph)?;

        graph
            .upsert_asset_node(&asset)
            .await
            .map_err(LineageError::Graph)?;

        graph
            .upsert_relationship(&system_id, &asset.id.to_string(), REL_SYSTEM_OWNS_ASSET)
            .await
            .map_err(LineageError::Graph)?;

        // Pull findings and their classifications, then aggregate.
        let findings = self
            .findings
            .list_findings(asset_id)
            .await
            .map_err(LineageError::UpstreamRead)?;

        let mut classifications = HashMap::with_capacity(findings.len());
        for finding in &findings {
            let mut linked = self
                .findings
                .get_classifications(finding.id)
                .await
                .map_err(LineageError::UpstreamRead)?;
            if !linked.is_empty() {
                classifications.insert(finding.id, linked.remove(0));
            }
        }

        let (aggregates, stats) = aggregate(&findings, &classifications);

        for (category, agg) in &aggregates {
            graph
                .upsert_category_node(category, category_props(agg))
                .await
                .map_err(LineageError::Graph)?;

            let created = graph
                .upsert_active_exposure(asset.id, category, scan_id)
                .await
                .map_err(LineageError::Graph)?;
            if created {
                info!(%asset_id, category, scan_id, "exposure window opened");
            }
        }

        info!(
            %asset_id,
            asset = %asset.name,
            categories = aggregates.len(),
            findings = stats.total_findings,
            skipped_no_classification = stats.skipped_no_classification,
            skipped_low_confidence = stats.skipped_low_confidence,
            skipped_missing_category = stats.skipped_missing_category,
            "asset lineage synced"
        );

        Ok(())
    }

    /// Sync every asset, isolating per-asset failures. Only a failure to
    /// enumerate assets is fatal.
    pub async fn sync_all(&self) -> Result<SyncReport, LineageError> {
        let scan_id = Uuid::new_v4().to_string();
        let mut report = SyncReport {
            scan_id: scan_id.clone(),
            ..Default::default()
        };

        if self.graph.is_none() {
            info!("graph store not configured, lineage sync skipped");
            return Ok(report);
        }

        let assets = self
            .findings
            .list_assets()
            .await
            .map_err(LineageError::UpstreamRead)?;
        report.total_assets = assets.len();

        for asset in assets {
            match self.sync_asset_for_scan(asset.id, &scan_id).await {
                Ok(()) => report.synced += 1,
                Err(err) => {
                    warn!(asset_id = %asset.id, asset = %asset.name, %err, "asset lineage sync failed");
                    report.failed += 1;
                    report.errors.push((asset.id, err.to_string()));
                }
            }
        }

        info!(
            total = report.total_assets,
            synced = report.synced,
            failed = report.failed,
            "lineage sync pass finished"
        );

        Ok(report)
    }

    /// Administrative closure of an exposure window. Sync passes never close
    /// edges themselves: an asset that stops reporting a category keeps its
    /// window open until remediation is confirmed through this call.
    pub async fn close_exposure(
        &self,
        asset_id: Uuid,
        category: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, LineageError> {
        let Some(graph) = self.graph.as_ref() else {
            return Ok(false);
        };
        graph
            .close_exposure(asset_id, category, closed_at)
            .await
            .map_err(LineageError::Graph)
    }
}

/// Property set written onto the category node for one sync pass.
fn category_props(agg: &CategoryAggregate) -> Properties {
    let avg_confidence = agg.avg_confidence();
    let risk = risk_level_for(&agg.category, avg_confidence);

    let mut props = Properties::new();
    props.insert("pii_type".into(), json!(agg.category));
    props.insert("dpdpa_category".into(), json!(agg.dpdpa_category));
    props.insert("requires_consent".into(), json!(agg.requires_consent));
    props.insert("finding_count".into(), json!(agg.finding_count));
    props.insert("avg_confidence".into(), json!(avg_confidence));
    props.insert("risk_level".into(), json!(risk.as_str()));
    props.insert("pattern_diversity".into(), json!(agg.pattern_diversity()));
    props.insert("pattern_counts".into(), json!(agg.pattern_counts));
    props.insert("severity_breakdown".into(), json!(agg.severity_counts));
    props
}
