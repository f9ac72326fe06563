mod engine;
mod parser;
mod languages;

pub mod syntax;

// DFD model and extraction passes
mod dfd;
mod analysis;

pub use parser::{ParsedSource, SourceParser};
pub use languages::{LanguageParser, PythonParser};

pub use dfd::{DfdGraph, DfdNode, Edge, NodeId, NodeKind};
pub use analysis::{
    parse_use_case, route_bindings, AnalysisReport, AnalysisStatistics, ComponentScanner,
    DfdAnalyzer, RouteBinding, TraceOutcome, UseCaseEnumerator, UseCaseTracer,
};

// Export the main engine
pub use engine::Engine;
