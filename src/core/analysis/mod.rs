// src/core/analysis/mod.rs
//! DFD extraction passes
//!
//! Component scanning and use-case enumeration each walk every source file
//! once. Tracing then locates a single handler and links it to the stores
//! and services its body touches.

mod analyzer;
mod component_scanner;
mod route_binding;
mod use_case_enumerator;
mod use_case_tracer;

pub use analyzer::{AnalysisReport, AnalysisStatistics, DfdAnalyzer};
pub use component_scanner::ComponentScanner;
pub use route_binding::{route_bindings, RouteBinding};
pub use use_case_enumerator::UseCaseEnumerator;
pub use use_case_tracer::{parse_use_case, TraceOutcome, UseCaseTracer};
