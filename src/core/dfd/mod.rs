// src/core/dfd/mod.rs
//! Data flow diagram model
//!
//! A label-indexed multigraph of processes, data stores and external
//! entities. The analysis passes only mutate it through `DfdGraph`.

mod graph;
mod node;

pub use graph::{DfdGraph, Edge, NodeId};
pub use node::{DfdNode, NodeKind};
