// src/core/analysis/component_scanner.rs
use tracing::debug;
use tree_sitter::Node;

use crate::config::RecognizerConfig;
use crate::core::dfd::{DfdGraph, DfdNode};
use crate::core::parser::ParsedSource;
use crate::core::syntax::{
    bare_name, call_function, is_module_level, member_access, node_text, preorder, SyntaxKind,
};

/// Finds data stores (model classes) and external clients (module-level
/// client construction) declared anywhere in a source file
pub struct ComponentScanner<'c> {
    config: &'c RecognizerConfig,
}

impl<'c> ComponentScanner<'c> {
    pub fn new(config: &'c RecognizerConfig) -> Self {
        Self { config }
    }

    /// Add every component found in `parsed` to the graph.
    /// Returns how many nodes were new.
    pub fn scan_source(&self, parsed: &ParsedSource, graph: &mut DfdGraph) -> usize {
        let source = parsed.source.as_str();
        let mut added = 0;

        for node in preorder(parsed.root()) {
            let found = match SyntaxKind::of(node) {
                SyntaxKind::ClassDef => self.recognize_store(node, source).into_iter().collect::<Vec<_>>(),
                SyntaxKind::Assignment if is_module_level(node) => self.recognize_clients(node, source),
                _ => Vec::new(),
            };

            for component in found {
                if graph.node_id(&component.label).is_some() {
                    continue;
                }
                debug!(
                    "{}: found {:?} '{}'",
                    parsed.path.display(),
                    component.kind,
                    component.label
                );
                graph.add_node(component);
                added += 1;
            }
        }

        added
    }

    /// `class User(db.Model)` or `class User(Model)`
    fn recognize_store(&self, class: Node, source: &str) -> Option<DfdNode> {
        let name = node_text(class.child_by_field_name("name")?, source);
        let bases = class.child_by_field_name("superclasses")?;

        let mut cursor = bases.walk();
        let is_model = bases.named_children(&mut cursor).any(|base| {
            if let Some((_, attribute)) = member_access(base, source) {
                self.config.store_base_attributes.iter().any(|a| a == attribute)
            } else if let Some(base_name) = bare_name(base, source) {
                self.config.store_base_names.iter().any(|n| n == base_name)
            } else {
                false
            }
        });

        is_model.then(|| {
            DfdNode::data_store(name, format!("{}: {}", self.config.store_kind, name))
                .with_prop("type", self.config.store_kind.as_str())
        })
    }

    /// `session = requests.Session()`, including chained and annotated forms
    fn recognize_clients(&self, assignment: Node, source: &str) -> Vec<DfdNode> {
        let mut targets = Vec::new();
        let mut current = assignment;

        let value = loop {
            if let Some(name) = current.child_by_field_name("left").and_then(|l| bare_name(l, source)) {
                targets.push(name);
            }
            match current.child_by_field_name("right") {
                Some(right) if SyntaxKind::of(right) == SyntaxKind::Assignment => current = right,
                Some(right) => break right,
                None => return Vec::new(),
            }
        };

        let Some(constructor) = self.client_constructor(value, source) else {
            return Vec::new();
        };

        targets
            .into_iter()
            .map(|target| {
                DfdNode::external_entity(target, format!("External client: {}", constructor))
                    .with_prop("constructor", constructor.as_str())
            })
            .collect()
    }

    /// `requests.Session(...)` -> "requests.Session"
    fn client_constructor(&self, value: Node, source: &str) -> Option<String> {
        if SyntaxKind::of(value) != SyntaxKind::Call {
            return None;
        }

        let (receiver, attribute) = member_access(call_function(value)?, source)?;
        let module = bare_name(receiver, source)?;

        let known = self.config.client_modules.iter().any(|m| m == module)
            && self.config.client_constructors.iter().any(|c| c == attribute);
        known.then(|| format!("{}.{}", module, attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dfd::NodeKind;
    use crate::core::syntax::test_support::parse;
    use std::path::PathBuf;

    fn scan(source: &str, graph: &mut DfdGraph) -> usize {
        let parsed = ParsedSource {
            path: PathBuf::from("app.py"),
            source: source.to_string(),
            tree: parse(source),
        };
        let config = RecognizerConfig::default();
        ComponentScanner::new(&config).scan_source(&parsed, graph)
    }

    #[test]
    fn test_recognizes_model_classes() {
        let source = r#"
class User(db.Model):
    id = db.Column(db.Integer, primary_key=True)

class Order(Model):
    pass

class Audit(Base, metaclass=Meta):
    pass

class Helper:
    pass
"#;
        let mut graph = DfdGraph::default();
        assert_eq!(scan(source, &mut graph), 2);

        let user = graph.get_node_by_label("User").unwrap();
        assert_eq!(user.kind, NodeKind::DataStore);
        assert_eq!(user.description, "SQLAlchemy Model: User");
        assert_eq!(user.prop("type"), Some("SQLAlchemy Model"));
        assert!(graph.get_node_by_label("Order").is_some());
        assert!(graph.get_node_by_label("Audit").is_none());
        assert!(graph.get_node_by_label("Helper").is_none());
    }

    #[test]
    fn test_recognizes_module_level_clients_only() {
        let source = r#"
import requests

session = requests.Session()
a = b = requests.Session()
typed: requests.Session = requests.Session()
other = httpx.Client()

def factory():
    local = requests.Session()
    return local
"#;
        let mut graph = DfdGraph::default();
        scan(source, &mut graph);

        let mut labels = graph.labels();
        labels.sort();
        assert_eq!(labels, vec!["a", "b", "session", "typed"]);

        let session = graph.get_node_by_label("session").unwrap();
        assert_eq!(session.kind, NodeKind::ExternalEntity);
        assert_eq!(session.prop("constructor"), Some("requests.Session"));
    }

    #[test]
    fn test_clients_in_module_level_blocks() {
        let source = r#"
import requests

try:
    billing = requests.Session()
except ImportError:
    billing = None

if True:
    geo = requests.Session()

with open("cfg") as fh:
    mail = requests.Session()

class Gateway:
    inner = requests.Session()

handler = lambda: requests.Session()

def factory():
    if True:
        local = requests.Session()
    return local
"#;
        let mut graph = DfdGraph::default();
        scan(source, &mut graph);

        let mut labels = graph.labels();
        labels.sort();
        assert_eq!(labels, vec!["billing", "geo", "mail"]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let source = "class User(db.Model):\n    pass\n\nhttp = requests.Session()\n";
        let mut graph = DfdGraph::default();

        assert_eq!(scan(source, &mut graph), 2);
        assert_eq!(scan(source, &mut graph), 0);
        assert_eq!(graph.node_count(), 2);
    }
}
