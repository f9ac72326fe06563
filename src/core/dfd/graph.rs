// src/core/dfd/graph.rs
use std::collections::HashMap;
use std::path::Path;
use serde::Serialize;

use crate::error::Result;
use super::{DfdNode, NodeKind};

/// Index of a node inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

/// Directed labeled flow. Identical edges are kept; each call site is observed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
}

/// Data flow diagram owning every node and edge
#[derive(Debug, Clone, Serialize)]
pub struct DfdGraph {
    pub name: String,
    nodes: Vec<DfdNode>,
    edges: Vec<Edge>,
    #[serde(skip)]
    by_label: HashMap<String, NodeId>,
}

impl DfdGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            by_label: HashMap::new(),
        }
    }

    /// Insert a node unless one with the same label exists.
    /// Returns the id of whichever node now owns the label.
    pub fn add_node(&mut self, node: DfdNode) -> NodeId {
        if let Some(&id) = self.by_label.get(&node.label) {
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.by_label.insert(node.label.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn get_node_by_label(&self, label: &str) -> Option<&DfdNode> {
        self.node_id(label).map(|id| &self.nodes[id.0])
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Id of the node with this label, only if it is of the given kind
    pub fn node_id_of_kind(&self, label: &str, kind: NodeKind) -> Option<NodeId> {
        self.node_id(label).filter(|id| self.nodes[id.0].is(kind))
    }

    pub fn node(&self, id: NodeId) -> &DfdNode {
        &self.nodes[id.0]
    }

    /// Append a directed labeled edge
    pub fn connect(&mut self, source: NodeId, target: NodeId, label: impl Into<String>) {
        self.edges.push(Edge {
            source,
            target,
            label: label.into(),
        });
    }

    pub fn nodes(&self) -> &[DfdNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outgoing(&self, source: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source == source)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &DfdNode> {
        self.nodes.iter().filter(move |node| node.is(kind))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.label.as_str()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        std::fs::write(path, self.to_json(pretty)?)?;
        Ok(())
    }
}

impl Default for DfdGraph {
    fn default() -> Self {
        Self::new("Flask App Analysis")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_keeps_labels_unique() {
        let mut graph = DfdGraph::default();
        let first = graph.add_node(DfdNode::data_store("User", "first"));
        let second = graph.add_node(DfdNode::external_entity("User", "second"));

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(first).description, "first");
        assert!(graph.node(first).is(NodeKind::DataStore));
    }

    #[test]
    fn test_lookup_by_label_and_kind() {
        let mut graph = DfdGraph::default();
        graph.add_node(DfdNode::data_store("User", "SQLAlchemy Model: User"));

        assert!(graph.get_node_by_label("User").is_some());
        assert!(graph.get_node_by_label("Order").is_none());
        assert!(graph.node_id_of_kind("User", NodeKind::DataStore).is_some());
        assert!(graph.node_id_of_kind("User", NodeKind::ExternalEntity).is_none());
    }

    #[test]
    fn test_connect_keeps_repeated_edges() {
        let mut graph = DfdGraph::default();
        let process = graph.add_node(DfdNode::process("GET /users", "Handler: list_users"));
        let store = graph.add_node(DfdNode::data_store("User", ""));

        graph.connect(process, store, "query");
        graph.connect(process, store, "query");

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing(process).count(), 2);
        assert_eq!(graph.outgoing(store).count(), 0);
    }

    #[test]
    fn test_json_uses_node_indices() {
        let mut graph = DfdGraph::new("Shop");
        let process = graph.add_node(DfdNode::process("POST /orders", "Handler: create_order"));
        let store = graph.add_node(DfdNode::data_store("Order", "").with_prop("type", "SQLAlchemy Model"));
        graph.connect(process, store, "add");

        let value: serde_json::Value = serde_json::from_str(&graph.to_json(false).unwrap()).unwrap();
        assert_eq!(value["name"], "Shop");
        assert_eq!(value["nodes"][1]["properties"]["type"], "SQLAlchemy Model");
        assert_eq!(value["nodes"][0]["kind"], "Process");
        assert_eq!(value["edges"][0]["source"], 0);
        assert_eq!(value["edges"][0]["target"], 1);
        assert_eq!(value["edges"][0]["label"], "add");
    }
}
