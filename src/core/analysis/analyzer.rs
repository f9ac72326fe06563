// src/core/analysis/analyzer.rs
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::dfd::{DfdGraph, NodeKind};
use crate::core::parser::{ParsedSource, SourceParser};
use crate::error::Result;
use super::{ComponentScanner, TraceOutcome, UseCaseEnumerator, UseCaseTracer};

/// Static DFD extraction over a set of source paths.
///
/// Every operation is file-partitioned: a file that cannot be read or parsed
/// is logged and skipped, and never aborts the pass.
pub struct DfdAnalyzer {
    config: Config,
    parser: SourceParser,
}

/// Output of the full pipeline
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub graph: DfdGraph,
    /// Distinct use cases in discovery order
    pub use_cases: Vec<String>,
    pub stats: AnalysisStatistics,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStatistics {
    pub files_discovered: usize,
    pub data_stores: usize,
    pub external_entities: usize,
    pub use_cases: usize,
    pub processes: usize,
    pub flows: usize,
    pub analysis_time_ms: u128,
}

impl DfdAnalyzer {
    pub fn new(config: Config) -> Result<Self> {
        let parser = SourceParser::new(&config.parsing)?;
        Ok(Self { config, parser })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the inventory graph of data stores and external clients
    pub fn scan_components<P: AsRef<Path>>(&mut self, paths: &[P]) -> DfdGraph {
        let files = self.parser.expand_paths(paths);
        let scanner = ComponentScanner::new(&self.config.recognizers);
        let mut graph = DfdGraph::new(self.config.project.name.as_str());

        visit_sources(&mut self.parser, &files, |parsed| {
            scanner.scan_source(parsed, &mut graph);
            ControlFlow::Continue(())
        });

        info!(
            "Scanned {} files: {} nodes",
            files.len(),
            graph.node_count()
        );
        graph
    }

    /// `"VERB PATH"` for every route binding, in file then source order
    pub fn identify_use_cases<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<String> {
        let files = self.parser.expand_paths(paths);
        let enumerator = UseCaseEnumerator::new(&self.config.recognizers);
        let mut use_cases = Vec::new();

        visit_sources(&mut self.parser, &files, |parsed| {
            use_cases.extend(enumerator.use_cases_in(parsed));
            ControlFlow::Continue(())
        });

        use_cases
    }

    /// Add the process for `use_case` and its flows to `graph`.
    /// Stops at the first file holding a matching handler.
    pub fn trace_use_case<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        use_case: &str,
        graph: &mut DfdGraph,
    ) -> TraceOutcome {
        let Some(tracer) = UseCaseTracer::new(&self.config.recognizers, use_case) else {
            warn!("Malformed use case '{}': expected \"VERB PATH\"", use_case);
            return TraceOutcome::Malformed;
        };

        let files = self.parser.expand_paths(paths);
        let mut outcome = TraceOutcome::NoMatch;

        visit_sources(&mut self.parser, &files, |parsed| {
            match tracer.trace_source(parsed, graph) {
                Some(traced) => {
                    outcome = traced;
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        });

        if outcome == TraceOutcome::NoMatch {
            debug!("No handler found for '{}'", use_case);
        }
        outcome
    }

    /// Scan, enumerate, and trace every distinct use case into one graph
    pub fn analyze<P: AsRef<Path>>(&mut self, paths: &[P]) -> AnalysisReport {
        let start_time = Instant::now();
        let files_discovered = self.parser.expand_paths(paths).len();

        let mut graph = self.scan_components(paths);

        let mut seen = HashSet::new();
        let use_cases: Vec<String> = self
            .identify_use_cases(paths)
            .into_iter()
            .filter(|use_case| seen.insert(use_case.clone()))
            .collect();
        info!("Found {} use cases", use_cases.len());

        for use_case in &use_cases {
            if let TraceOutcome::Traced { handler, flows, .. } = self.trace_use_case(paths, use_case, &mut graph) {
                debug!("{} -> {} ({} flows)", use_case, handler, flows);
            }
        }

        let stats = AnalysisStatistics {
            files_discovered,
            data_stores: graph.nodes_of_kind(NodeKind::DataStore).count(),
            external_entities: graph.nodes_of_kind(NodeKind::ExternalEntity).count(),
            use_cases: use_cases.len(),
            processes: graph.nodes_of_kind(NodeKind::Process).count(),
            flows: graph.edge_count(),
            analysis_time_ms: start_time.elapsed().as_millis(),
        };

        AnalysisReport {
            graph,
            use_cases,
            stats,
        }
    }
}

/// Parse each file in order and hand it to `visit`; unparseable files are logged and skipped
fn visit_sources<F>(parser: &mut SourceParser, files: &[PathBuf], mut visit: F)
where
    F: FnMut(&ParsedSource) -> ControlFlow<()>,
{
    for file in files {
        match parser.parse_file(file) {
            Ok(parsed) => {
                if visit(&parsed).is_break() {
                    return;
                }
            }
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }
}
