//! Detector subprocess invocation.
//!
//! The detector is an opaque external scanner: the orchestrator hands it a
//! connection config and an ingestion callback URL, then judges the whole run
//! by the exit code alone. Findings flow back through the ingestion path, not
//! through stdout.

use std::path::PathBuf;
use tokio::process::Command;

/// How to invoke the detector binary for a scan-all cycle.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl DetectorConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// The standard invocation shape: connection config, ingestion callback,
    /// quiet output.
    pub fn standard(
        program: impl Into<PathBuf>,
        config_path: impl Into<String>,
        ingest_url: impl Into<String>,
    ) -> Self {
        Self::new(program)
            .arg("--config")
            .arg(config_path)
            .arg("--ingest-url")
            .arg(ingest_url)
            .arg("--quiet")
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);
        cmd
    }
}
