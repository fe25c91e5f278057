// src/core/engine.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use super::{
    ArchitectureReport, BackendInferrer, ContractReport, EntryPointDetector, ScanProfile,
    TreeWalker,
};

/// Main orchestration engine: walks a root and writes reports
pub struct Engine {
    config: Config,
    detector: EntryPointDetector,
    inferrer: BackendInferrer,
}

impl Engine {
    /// Create an engine from a config file, falling back to defaults
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let detector = EntryPointDetector::new(&config.entries);
        let inferrer = BackendInferrer::new(&config.inference);

        Self {
            config,
            detector,
            inferrer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the architecture report for `root` without writing it
    pub fn architecture_report(&self, root: &Path) -> Result<ArchitectureReport> {
        let walker = TreeWalker::new(&self.config.scan, ScanProfile::Architecture)?;
        let scan = walker.walk(root)?;
        let entries = self.detector.detect(root);

        info!("Repository topology: {:?}", entries.topology());
        Ok(ArchitectureReport::assemble(root, entries, scan, &self.inferrer))
    }

    /// Build the backend contract for `root` without writing it
    pub fn contract_report(&self, root: &Path) -> Result<ContractReport> {
        let walker = TreeWalker::new(&self.config.scan, ScanProfile::Contract)?;
        let scan = walker.walk(root)?;

        info!("Found {} distinct API call targets", scan.api_calls.len());
        Ok(ContractReport::assemble(scan, &self.inferrer))
    }

    /// Scan and write `repo_architecture_report.json` (or `output`)
    pub async fn architecture(&self, root: Option<PathBuf>, output: Option<PathBuf>) -> Result<PathBuf> {
        let root = resolve_root(root)?;
        let output = output.unwrap_or_else(|| self.config.output.architecture_report.clone());

        info!("🔍 Analyzing repository architecture in {}", root.display());
        let report = self.architecture_report(&root)?;
        write_report(&report, &output).await?;

        println!("✅ Repository architecture analysis complete");
        println!("📄 Output: {}", output.display());
        Ok(output)
    }

    /// Scan and write `backend_contract.json` (or `output`)
    pub async fn contract(&self, root: Option<PathBuf>, output: Option<PathBuf>) -> Result<PathBuf> {
        let root = resolve_root(root)?;
        let output = output.unwrap_or_else(|| self.config.output.contract_report.clone());

        info!("🔍 Inferring backend contract from {}", root.display());
        let report = self.contract_report(&root)?;
        write_report(&report, &output).await?;

        println!("✅ Backend contract generated");
        println!("📄 Output: {}", output.display());
        Ok(output)
    }

    /// Write the active configuration as `stackmap.toml` under `path`
    pub async fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let dir = resolve_root(path)?;
        let config_path = dir.join("stackmap.toml");

        if config_path.exists() {
            warn!("Configuration already exists at {}", config_path.display());
            return Ok(());
        }

        self.config.save(&config_path)?;
        info!("📝 Wrote configuration to {}", config_path.display());
        Ok(())
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to resolve working directory"),
    }
}

async fn write_report<T: Serialize>(report: &T, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(output, json)
        .await
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    Ok(())
}
