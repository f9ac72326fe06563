// src/core/dfd/node.rs
use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Request handler, one per traced use case
    Process,
    /// Persistent model or table
    DataStore,
    /// Third-party service reached over the network
    ExternalEntity,
}

/// A node of the diagram. The label is its identity within a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfdNode {
    pub kind: NodeKind,
    pub label: String,
    pub description: String,
    pub properties: BTreeMap<String, String>,
}

impl DfdNode {
    pub fn new(kind: NodeKind, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            description: description.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn process(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NodeKind::Process, label, description)
    }

    pub fn data_store(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NodeKind::DataStore, label, description)
    }

    pub fn external_entity(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NodeKind::ExternalEntity, label, description)
    }

    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Builder form of `set_prop`
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_prop(key, value);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }
}
