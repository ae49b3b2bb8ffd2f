//! Arclight orchestrator CLI
//!
//! One-shot driver for the scan and lineage pipeline.
//!
//! Usage:
//!     arclight-orchestrator scan --database arclight.db --detector /usr/local/bin/pii-detector
//!     arclight-orchestrator sync --database arclight.db
//!     arclight-orchestrator status --database arclight.db

use anyhow::Context;
use arclight_db::ArclightDb;
use arclight_graph::MemoryGraph;
use arclight_lineage::{LineageSynchronizer, TemporalExposureTracker};
use arclight_orchestrator::{DetectorConfig, ScanOrchestrator};
use arclight_protocol::FindingStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "arclight-orchestrator", about = "PII scan orchestration and lineage sync")]
struct Args {
    /// Path to the sqlite finding store
    #[arg(long, global = true, default_value = "arclight.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scan-all cycle and wait for it to settle
    Scan {
        /// Detector binary to execute
        #[arg(long)]
        detector: PathBuf,

        /// Detector connection config path
        #[arg(long, default_value = "connections.yaml")]
        config: String,

        /// Ingestion callback URL handed to the detector
        #[arg(long, default_value = "http://127.0.0.1:8080/ingest")]
        ingest_url: String,
    },

    /// Mirror the finding store into the lineage graph and print exposure
    Sync,

    /// Show the asset inventory
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arclight=info,arclight_orchestrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let db = Arc::new(
        ArclightDb::open(&args.database)
            .await
            .with_context(|| format!("opening finding store {}", args.database.display()))?,
    );

    match args.command {
        Command::Scan {
            detector,
            config,
            ingest_url,
        } => {
            let graph = Arc::new(MemoryGraph::new());
            let lineage = Arc::new(LineageSynchronizer::new(db.clone(), Some(graph)));
            let detector = DetectorConfig::standard(detector, config, ingest_url);
            let orchestrator = Arc::new(ScanOrchestrator::new(db, detector, Some(lineage)));

            orchestrator.scan_all().await?;
            orchestrator.wait_for_scan().await;

            let status = orchestrator.status();
            println!("{}", serde_json::to_string_pretty(&status)?);
            for job in orchestrator.jobs() {
                println!(
                    "  {} {} [{}] {}%",
                    job.id,
                    job.asset_name,
                    job.status,
                    job.progress
                );
            }
            if status.failed_jobs > 0 {
                anyhow::bail!("{} of {} jobs failed", status.failed_jobs, status.total_jobs);
            }
        }

        Command::Sync => {
            let graph = Arc::new(MemoryGraph::new());
            let lineage = LineageSynchronizer::new(db.clone(), Some(graph.clone()));
            let report = lineage.sync_all().await?;
            println!(
                "synced {}/{} assets (scan {})",
                report.synced, report.total_assets, report.scan_id
            );
            for (asset_id, err) in &report.errors {
                println!("  failed {asset_id}: {err}");
            }

            let tracker = TemporalExposureTracker::new(graph);
            for asset in db.list_assets().await? {
                let active = tracker.active_exposures(asset.id).await?;
                if !active.is_empty() {
                    let categories: Vec<&str> =
                        active.iter().map(|e| e.category.as_str()).collect();
                    println!("  {} exposes {}", asset.name, categories.join(", "));
                }
            }
        }

        Command::Status => {
            let assets = db.list_assets().await?;
            println!("{} assets", assets.len());
            for asset in assets {
                println!(
                    "  {} {} ({}, {} findings)",
                    asset.id, asset.name, asset.host, asset.total_findings
                );
            }
        }
    }

    Ok(())
}
