//! In-memory graph engine.

use arclight_protocol::{
    Asset, ExposureEdge, ExposureFilter, GraphStore, StoreError,
    store::Properties,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

use crate::{LABEL_ASSET, LABEL_PII_CATEGORY, LABEL_SYSTEM};

/// Identity of a node: label plus key within that label.
pub type NodeKey = (String, String);

/// A graph node. Properties merge on upsert; later writes win per key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub label: String,
    pub key: String,
    pub display: String,
    pub props: Properties,
}

/// An untemporal relationship, identified by (from, to, type).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Relationship {
    pub from_id: String,
    pub to_id: String,
    pub rel_type: String,
}

#[derive(Default)]
struct GraphInner {
    nodes: BTreeMap<NodeKey, Node>,
    relationships: BTreeMap<(String, String, String), Relationship>,
    /// Exposure windows per (asset, category), in creation order. At most
    /// one window per key has `until = None`.
    exposures: BTreeMap<(Uuid, String), Vec<ExposureEdge>>,
}

/// Thread-safe in-process graph store.
#[derive(Default)]
pub struct MemoryGraph {
    inner: RwLock<GraphInner>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphInner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("graph lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphInner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("graph lock poisoned"))
    }

    fn upsert_node(
        &self,
        label: &str,
        key: &str,
        display: &str,
        props: Properties,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let entry = inner
            .nodes
            .entry((label.to_string(), key.to_string()))
            .or_insert_with(|| Node {
                label: label.to_string(),
                key: key.to_string(),
                display: display.to_string(),
                props: Properties::new(),
            });
        entry.display = display.to_string();
        for (k, v) in props {
            entry.props.insert(k, v);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection (used by callers asserting idempotency)
    // ------------------------------------------------------------------

    /// Snapshot of one node, if present.
    pub fn node(&self, label: &str, key: &str) -> Option<Node> {
        self.read()
            .ok()?
            .nodes
            .get(&(label.to_string(), key.to_string()))
            .cloned()
    }

    pub fn node_count(&self) -> usize {
        self.read().map(|g| g.nodes.len()).unwrap_or(0)
    }

    pub fn relationship_count(&self) -> usize {
        self.read().map(|g| g.relationships.len()).unwrap_or(0)
    }

    /// Total exposure edge count for an asset, active and closed.
    pub fn exposure_count(&self, asset_id: Uuid) -> usize {
        self.read()
            .map(|g| {
                g.exposures
                    .iter()
                    .filter(|((aid, _), _)| *aid == asset_id)
                    .map(|(_, windows)| windows.len())
                    .sum()
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn upsert_system_node(
        &self,
        id: &str,
        label: &str,
        props: Properties,
    ) -> Result<(), StoreError> {
        self.upsert_node(LABEL_SYSTEM, id, label, props)
    }

    async fn upsert_asset_node(&self, asset: &Asset) -> Result<(), StoreError> {
        let mut props = Properties::new();
        props.insert("stable_id".into(), json!(asset.stable_id));
        props.insert("name".into(), json!(asset.name));
        props.insert("path".into(), json!(asset.path));
        props.insert("asset_type".into(), json!(asset.asset_type));
        props.insert("host".into(), json!(asset.host));
        props.insert("environment".into(), json!(asset.environment));
        self.upsert_node(LABEL_ASSET, &asset.id.to_string(), &asset.name, props)
    }

    async fn upsert_category_node(
        &self,
        category: &str,
        props: Properties,
    ) -> Result<(), StoreError> {
        self.upsert_node(LABEL_PII_CATEGORY, category, category, props)
    }

    async fn upsert_relationship(
        &self,
        from_id: &str,
        to_id: &str,
        rel_type: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let key = (
            from_id.to_string(),
            to_id.to_string(),
            rel_type.to_string(),
        );
        inner.relationships.entry(key).or_insert_with(|| Relationship {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            rel_type: rel_type.to_string(),
        });
        Ok(())
    }

    async fn upsert_active_exposure(
        &self,
        asset_id: Uuid,
        category: &str,
        scan_id: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let windows = inner
            .exposures
            .entry((asset_id, category.to_string()))
            .or_default();

        if let Some(active) = windows.iter_mut().find(|w| w.until.is_none()) {
            // Re-observation: refresh last_scan_id, never touch since.
            active.last_scan_id = scan_id.to_string();
            return Ok(false);
        }

        debug!(%asset_id, category, scan_id, "opening exposure window");
        windows.push(ExposureEdge {
            asset_id,
            category: category.to_string(),
            since: Utc::now(),
            until: None,
            first_scan_id: scan_id.to_string(),
            last_scan_id: scan_id.to_string(),
        });
        Ok(true)
    }

    async fn close_exposure(
        &self,
        asset_id: Uuid,
        category: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let Some(windows) = inner.exposures.get_mut(&(asset_id, category.to_string())) else {
            return Ok(false);
        };

        match windows.iter_mut().find(|w| w.until.is_none()) {
            Some(active) => {
                debug!(%asset_id, category, %closed_at, "closing exposure window");
                active.until = Some(closed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_exposure_edges(
        &self,
        asset_id: Uuid,
        filter: ExposureFilter,
    ) -> Result<Vec<ExposureEdge>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .exposures
            .iter()
            .filter(|((aid, _), _)| *aid == asset_id)
            .flat_map(|(_, windows)| windows.iter())
            .filter(|edge| filter.matches(edge))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn asset_fixture() -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            stable_id: "stable-1".into(),
            name: "customers".into(),
            path: "/data/customers.csv".into(),
            asset_type: "file".into(),
            host: "db-host-01".into(),
            environment: "production".into(),
            owner: "data-platform".into(),
            source_system: "postgres".into(),
            total_findings: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn node_upserts_merge_properties() {
        let graph = MemoryGraph::new();

        let mut props = Properties::new();
        props.insert("host".into(), json!("db-host-01"));
        graph
            .upsert_system_node("system-db-host-01", "db-host-01", props)
            .await
            .unwrap();

        let mut props = Properties::new();
        props.insert("environment".into(), json!("production"));
        graph
            .upsert_system_node("system-db-host-01", "db-host-01", props)
            .await
            .unwrap();

        assert_eq!(graph.node_count(), 1);
        let node = graph.node(LABEL_SYSTEM, "system-db-host-01").unwrap();
        assert_eq!(node.props["host"], json!("db-host-01"));
        assert_eq!(node.props["environment"], json!("production"));
    }

    #[tokio::test]
    async fn relationships_are_idempotent() {
        let graph = MemoryGraph::new();
        for _ in 0..3 {
            graph
                .upsert_relationship("system-a", "asset-1", crate::REL_SYSTEM_OWNS_ASSET)
                .await
                .unwrap();
        }
        assert_eq!(graph.relationship_count(), 1);
    }

    #[tokio::test]
    async fn at_most_one_active_edge_per_pair() {
        let graph = MemoryGraph::new();
        let asset_id = Uuid::new_v4();

        let created = graph
            .upsert_active_exposure(asset_id, "IN_PAN", "scan-1")
            .await
            .unwrap();
        assert!(created);

        let created = graph
            .upsert_active_exposure(asset_id, "IN_PAN", "scan-2")
            .await
            .unwrap();
        assert!(!created);

        let active = graph
            .query_exposure_edges(asset_id, ExposureFilter::active())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].first_scan_id, "scan-1");
        assert_eq!(active[0].last_scan_id, "scan-2");
    }

    #[tokio::test]
    async fn reobservation_preserves_since() {
        let graph = MemoryGraph::new();
        let asset_id = Uuid::new_v4();

        graph
            .upsert_active_exposure(asset_id, "CREDIT_CARD", "scan-1")
            .await
            .unwrap();
        let before = graph
            .query_exposure_edges(asset_id, ExposureFilter::default())
            .await
            .unwrap();

        graph
            .upsert_active_exposure(asset_id, "CREDIT_CARD", "scan-9")
            .await
            .unwrap();
        let after = graph
            .query_exposure_edges(asset_id, ExposureFilter::default())
            .await
            .unwrap();

        assert_eq!(before[0].since, after[0].since);
        assert_eq!(after[0].last_scan_id, "scan-9");
    }

    #[tokio::test]
    async fn close_then_reobserve_opens_fresh_window() {
        let graph = MemoryGraph::new();
        let asset_id = Uuid::new_v4();

        graph
            .upsert_active_exposure(asset_id, "EMAIL_ADDRESS", "scan-1")
            .await
            .unwrap();
        let closed = graph
            .close_exposure(asset_id, "EMAIL_ADDRESS", Utc::now())
            .await
            .unwrap();
        assert!(closed);

        // Closing again is a no-op.
        let closed = graph
            .close_exposure(asset_id, "EMAIL_ADDRESS", Utc::now())
            .await
            .unwrap();
        assert!(!closed);

        let created = graph
            .upsert_active_exposure(asset_id, "EMAIL_ADDRESS", "scan-2")
            .await
            .unwrap();
        assert!(created);

        let all = graph
            .query_exposure_edges(asset_id, ExposureFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        let active: Vec<_> = all.iter().filter(|e| e.is_active()).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].first_scan_id, "scan-2");
        // The old window's since is untouched by re-exposure.
        let old = all.iter().find(|e| !e.is_active()).unwrap();
        assert_eq!(old.first_scan_id, "scan-1");
    }

    #[tokio::test]
    async fn query_filters_by_time_and_category() {
        let graph = MemoryGraph::new();
        let asset_id = Uuid::new_v4();

        graph
            .upsert_active_exposure(asset_id, "IN_PAN", "scan-1")
            .await
            .unwrap();
        graph
            .upsert_active_exposure(asset_id, "IN_AADHAAR", "scan-1")
            .await
            .unwrap();

        let by_category = graph
            .query_exposure_edges(asset_id, ExposureFilter::for_category("IN_PAN"))
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);

        let before_everything = Utc::now() - Duration::hours(1);
        let none = graph
            .query_exposure_edges(asset_id, ExposureFilter::at(before_everything))
            .await
            .unwrap();
        assert!(none.is_empty());

        let other_asset = graph
            .query_exposure_edges(Uuid::new_v4(), ExposureFilter::default())
            .await
            .unwrap();
        assert!(other_asset.is_empty());
    }

    #[tokio::test]
    async fn asset_node_carries_identity_props() {
        let graph = MemoryGraph::new();
        let asset = asset_fixture();
        graph.upsert_asset_node(&asset).await.unwrap();

        let node = graph.node(LABEL_ASSET, &asset.id.to_string()).unwrap();
        assert_eq!(node.display, "customers");
        assert_eq!(node.props["host"], json!("db-host-01"));
    }
}
