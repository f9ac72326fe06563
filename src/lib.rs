//! Static reconstruction of data flow diagrams from Python web applications.
//!
//! `DfdAnalyzer` exposes the three passes: component scanning, use-case
//! enumeration and use-case tracing.

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::core::{
    AnalysisReport, DfdAnalyzer, DfdGraph, DfdNode, Edge, NodeId, NodeKind, TraceOutcome,
};
pub use crate::error::{DfdError, Result};
