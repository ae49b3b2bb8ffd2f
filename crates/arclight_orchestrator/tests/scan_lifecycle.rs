//! Scan-all lifecycle against real subprocesses (`true`, `false`, and a
//! binary that does not exist).

use arclight_db::{ArclightDb, MemoryFindingStore};
use arclight_graph::{MemoryGraph, LABEL_PII_CATEGORY};
use arclight_lineage::LineageSynchronizer;
use arclight_orchestrator::{DetectorConfig, ScanOrchestrator};
use arclight_protocol::{Asset, Classification, Finding, JobStatus, OverallStatus};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

fn asset(name: &str) -> Asset {
    let now = Utc::now();
    Asset {
        id: Uuid::new_v4(),
        stable_id: format!("stable-{name}"),
        name: name.to_string(),
        path: format!("/data/{name}"),
        asset_type: "file".to_string(),
        host: "db-host-01".to_string(),
        environment: "production".to_string(),
        owner: "data-platform".to_string(),
        source_system: "postgres".to_string(),
        total_findings: 0,
        created_at: now,
        updated_at: now,
    }
}

fn seeded_store(count: usize) -> Arc<MemoryFindingStore> {
    let store = MemoryFindingStore::new();
    for i in 0..count {
        store.add_asset(asset(&format!("asset-{i}")));
    }
    Arc::new(store)
}

#[tokio::test]
async fn successful_cycle_completes_every_job() {
    let store = seeded_store(3);
    let orch = Arc::new(ScanOrchestrator::new(
        store,
        DetectorConfig::new("true"),
        None,
    ));

    let snapshot = orch.scan_all().await.unwrap();
    assert_eq!(snapshot.total_jobs, 3);
    assert_eq!(snapshot.queued_jobs, 3);
    assert_eq!(snapshot.overall_status, OverallStatus::Scanning);
    assert!(snapshot.started_at.is_some());
    assert!(snapshot.completed_at.is_none());

    orch.wait_for_scan().await;

    let status = orch.status();
    assert_eq!(status.completed_jobs, 3);
    assert_eq!(status.failed_jobs, 0);
    assert_eq!(status.overall_status, OverallStatus::Completed);
    assert_eq!(status.progress_percent, 100);
    assert!(status.completed_at.is_some());

    for job in orch.jobs() {
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.error.is_none());
        assert!(job.completed_at.is_some());
    }
}

#[tokio::test]
async fn nonzero_exit_fails_every_job_with_a_generic_message() {
    let store = seeded_store(2);
    let orch = Arc::new(ScanOrchestrator::new(
        store,
        DetectorConfig::new("false"),
        None,
    ));

    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;

    let status = orch.status();
    assert_eq!(status.failed_jobs, 2);
    assert_eq!(status.overall_status, OverallStatus::Completed);
    assert_eq!(status.progress_percent, 0);

    for job in orch.jobs() {
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error.as_deref(),
            Some("Detector process exited with an error")
        );
    }
}

#[tokio::test]
async fn spawn_failure_fails_every_job() {
    let store = seeded_store(1);
    let orch = Arc::new(ScanOrchestrator::new(
        store,
        DetectorConfig::new("/nonexistent/arclight-pii-detector"),
        None,
    ));

    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;

    let jobs = orch.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert_eq!(
        jobs[0].error.as_deref(),
        Some("Failed to start detector process")
    );
}

#[tokio::test]
async fn empty_inventory_gets_a_discovery_placeholder() {
    let store = Arc::new(MemoryFindingStore::new());
    let orch = Arc::new(ScanOrchestrator::new(
        store,
        DetectorConfig::new("true"),
        None,
    ));

    let snapshot = orch.scan_all().await.unwrap();
    assert_eq!(snapshot.total_jobs, 1);

    let jobs = orch.jobs();
    assert_eq!(jobs[0].asset_name, "Global Discovery Scan");
    assert_eq!(jobs[0].asset_path, "*");
    assert!(jobs[0].asset_id.is_none());

    orch.wait_for_scan().await;
    assert_eq!(orch.status().completed_jobs, 1);
}

#[tokio::test]
async fn new_cycle_replaces_the_previous_job_table() {
    let store = seeded_store(3);
    let orch = Arc::new(ScanOrchestrator::new(
        store.clone(),
        DetectorConfig::new("true"),
        None,
    ));

    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;
    let first_ids: Vec<String> = orch.jobs().into_iter().map(|j| j.id).collect();

    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;

    let jobs = orch.jobs();
    assert_eq!(jobs.len(), 3);
    for job in &jobs {
        assert!(!first_ids.contains(&job.id));
        assert_eq!(job.status, JobStatus::Completed);
    }
}

#[tokio::test]
async fn sqlite_backed_store_drives_a_cycle() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = Arc::new(
        ArclightDb::open(dir.path().join("arclight.db"))
            .await
            .unwrap(),
    );
    db.upsert_asset(&asset("customers")).await.unwrap();

    let orch = Arc::new(ScanOrchestrator::new(
        db,
        DetectorConfig::new("true"),
        None,
    ));
    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;

    let status = orch.status();
    assert_eq!(status.completed_jobs, 1);
    assert_eq!(status.progress_percent, 100);
}

#[tokio::test]
async fn successful_cycle_triggers_lineage_sync() {
    let store = Arc::new(MemoryFindingStore::new());
    let a = asset("customers");
    store.add_asset(a.clone());
    let finding = Finding {
        id: Uuid::new_v4(),
        asset_id: a.id,
        pattern_name: "pan_number".to_string(),
        matches: vec!["masked".to_string()],
        severity: "high".to_string(),
        created_at: Utc::now(),
    };
    store.add_classification(Classification {
        id: Uuid::new_v4(),
        finding_id: finding.id,
        classification_type: "PII".to_string(),
        sub_category: "IN_PAN".to_string(),
        confidence_score: 0.9,
        dpdpa_category: String::new(),
        requires_consent: false,
        created_at: Utc::now(),
    });
    store.add_finding(finding);

    let graph = Arc::new(MemoryGraph::new());
    let lineage = Arc::new(LineageSynchronizer::new(
        store.clone(),
        Some(graph.clone()),
    ));
    let orch = Arc::new(ScanOrchestrator::new(
        store,
        DetectorConfig::new("true"),
        Some(lineage),
    ));

    orch.scan_all().await.unwrap();
    orch.wait_for_scan().await;

    assert!(graph.node(LABEL_PII_CATEGORY, "IN_PAN").is_some());
}
