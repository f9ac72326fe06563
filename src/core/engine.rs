// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use super::{DfdAnalyzer, TraceOutcome};

/// Command orchestration on top of `DfdAnalyzer`
pub struct Engine {
    analyzer: DfdAnalyzer,
}

impl Engine {
    /// Create a new engine instance from an optional configuration file
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Ok(Self {
            analyzer: DfdAnalyzer::new(config)?,
        })
    }

    /// Write a default configuration file
    pub fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let path = path.unwrap_or_else(|| PathBuf::from("dfdscan.toml"));
        if path.exists() {
            warn!("{} already exists, leaving it untouched", path.display());
            return Ok(());
        }

        Config::default()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Inventory of stores and external clients
    pub fn components(&mut self, paths: Vec<PathBuf>, output: Option<PathBuf>) -> Result<()> {
        let paths = self.resolve_paths(paths);
        info!("Scanning components in {} path(s)", paths.len());

        let graph = self.analyzer.scan_components(&paths);
        self.emit(&graph, output)
    }

    /// Print one `VERB PATH` per line
    pub fn use_cases(&mut self, paths: Vec<PathBuf>, unique: bool) -> Result<()> {
        let paths = self.resolve_paths(paths);
        let mut use_cases = self.analyzer.identify_use_cases(&paths);

        if unique {
            let mut seen = std::collections::HashSet::new();
            use_cases.retain(|use_case| seen.insert(use_case.clone()));
        }

        for use_case in use_cases {
            println!("{}", use_case);
        }
        Ok(())
    }

    /// Scan components, then trace a single use case into the inventory
    pub fn trace(&mut self, paths: Vec<PathBuf>, use_case: &str, output: Option<PathBuf>) -> Result<()> {
        let paths = self.resolve_paths(paths);
        let mut graph = self.analyzer.scan_components(&paths);

        match self.analyzer.trace_use_case(&paths, use_case, &mut graph) {
            TraceOutcome::Traced { handler, flows, .. } => {
                info!("Traced '{}' to handler {} ({} flows)", use_case, handler, flows);
            }
            TraceOutcome::NoMatch => warn!("No handler found for '{}'", use_case),
            TraceOutcome::Malformed => warn!("'{}' is not of the form \"VERB PATH\"", use_case),
        }

        self.emit(&graph, output)
    }

    /// Full pipeline: every distinct use case traced into one graph
    pub fn analyze(&mut self, paths: Vec<PathBuf>, output: Option<PathBuf>) -> Result<()> {
        let paths = self.resolve_paths(paths);
        info!("Analyzing {} path(s)", paths.len());

        let report = self.analyzer.analyze(&paths);

        let stats = &report.stats;
        info!("Analysis complete in {} ms:", stats.analysis_time_ms);
        info!("  - {} source files", stats.files_discovered);
        info!("  - {} data stores", stats.data_stores);
        info!("  - {} external entities", stats.external_entities);
        info!("  - {} use cases, {} processes", stats.use_cases, stats.processes);
        info!("  - {} flows", stats.flows);

        self.emit(&report, output)
    }

    fn resolve_paths(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        if paths.is_empty() {
            self.analyzer.config().project.source_dirs.clone()
        } else {
            paths
        }
    }

    /// JSON to `output`, or stdout
    fn emit<T: Serialize>(&self, value: &T, output: Option<PathBuf>) -> Result<()> {
        let json = if self.analyzer.config().output.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        match output {
            Some(path) => {
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
