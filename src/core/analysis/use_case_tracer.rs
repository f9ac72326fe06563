// src/core/analysis/use_case_tracer.rs
use tracing::{debug, warn};
use tree_sitter::Node;

use crate::config::RecognizerConfig;
use crate::core::dfd::{DfdGraph, DfdNode, NodeId, NodeKind};
use crate::core::parser::ParsedSource;
use crate::core::syntax::{
    bare_name, call_function, member_access, node_text, positional_args, preorder,
    string_literal, SyntaxKind,
};
use super::route_binding::route_bindings;

/// Result of tracing one use case into a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    /// A handler matched; its process node and flows were added
    Traced {
        handler: String,
        process: NodeId,
        flows: usize,
    },
    /// No handler declares this verb and path
    NoMatch,
    /// The id has no verb/path separator
    Malformed,
}

/// Split `"VERB PATH"` at the first whitespace
pub fn parse_use_case(use_case: &str) -> Option<(&str, &str)> {
    let (verb, path) = use_case.split_once(char::is_whitespace)?;
    (!verb.is_empty()).then_some((verb, path))
}

/// Locates the handler of one use case and links it into the graph
pub struct UseCaseTracer<'c> {
    config: &'c RecognizerConfig,
    use_case: &'c str,
    verb: &'c str,
    path: &'c str,
}

impl<'c> UseCaseTracer<'c> {
    /// `None` for a malformed use-case id
    pub fn new(config: &'c RecognizerConfig, use_case: &'c str) -> Option<Self> {
        let (verb, path) = parse_use_case(use_case)?;
        Some(Self {
            config,
            use_case,
            verb,
            path,
        })
    }

    /// First function in `parsed` bound to this verb and path
    pub fn locate<'t>(&self, parsed: &'t ParsedSource) -> Option<Node<'t>> {
        let source = parsed.source.as_str();

        preorder(parsed.root())
            .into_iter()
            .filter(|node| SyntaxKind::of(*node) == SyntaxKind::FunctionDef)
            .find(|function| {
                route_bindings(*function, source, self.config)
                    .iter()
                    .any(|binding| binding.matches(self.verb, self.path))
            })
    }

    /// Trace within one file. `None` when the file holds no matching handler.
    pub fn trace_source(&self, parsed: &ParsedSource, graph: &mut DfdGraph) -> Option<TraceOutcome> {
        let function = self.locate(parsed)?;
        let source = parsed.source.as_str();

        let handler = function
            .child_by_field_name("name")
            .map(|name| node_text(name, source))
            .unwrap_or_default()
            .to_string();

        let process_node = DfdNode::process(self.use_case, format!("Handler: {}", handler))
            .with_prop("handler", handler.as_str())
            .with_prop(
                "location",
                format!("{}:{}", parsed.path.display(), function.start_position().row + 1),
            );
        let process = graph.add_node(process_node);

        let mut analyzer = BodyAnalyzer {
            config: self.config,
            graph,
            process,
            flows: 0,
        };
        if let Some(body) = function.child_by_field_name("body") {
            analyzer.analyze(body, source);
        }

        debug!(
            "Traced '{}' to {} in {} ({} flows)",
            self.use_case,
            handler,
            parsed.path.display(),
            analyzer.flows
        );

        Some(TraceOutcome::Traced {
            handler,
            process,
            flows: analyzer.flows,
        })
    }
}

/// Links a process to the stores and services its body calls
struct BodyAnalyzer<'c, 'g> {
    config: &'c RecognizerConfig,
    graph: &'g mut DfdGraph,
    process: NodeId,
    flows: usize,
}

impl BodyAnalyzer<'_, '_> {
    fn analyze(&mut self, body: Node, source: &str) {
        for node in preorder(body) {
            if SyntaxKind::of(node) == SyntaxKind::Call {
                self.visit_call(node, source);
            }
        }
    }

    fn visit_call(&mut self, call: Node, source: &str) {
        let Some((receiver, attribute)) = call_function(call).and_then(|f| member_access(f, source)) else {
            return;
        };

        if let Some((model, operation)) = self.store_operation(receiver, attribute, source) {
            // Stores must already be known; a miss adds nothing.
            match self.graph.node_id_of_kind(model, NodeKind::DataStore) {
                Some(store) => self.flow(store, operation),
                None => debug!("No data store named '{}' for '{}'", model, operation),
            }
        }

        let Some(name) = bare_name(receiver, source) else {
            return;
        };
        if !self.config.http_verbs.iter().any(|v| v == attribute) {
            return;
        }

        if self.config.http_modules.iter().any(|m| m == name) {
            let label = positional_args(call)
                .first()
                .and_then(|arg| string_literal(*arg, source))
                .unwrap_or_else(|| self.config.external_fallback_label.clone());
            self.external_call(&label, attribute);
        } else if let Some(client) = self.graph.node_id_of_kind(name, NodeKind::ExternalEntity) {
            self.flow(client, &attribute.to_uppercase());
        }
    }

    /// `User.query(...)`, or a call hanging off `User.query` such as `User.query.all()`
    fn store_operation<'s>(&self, receiver: Node, attribute: &'s str, source: &'s str) -> Option<(&'s str, &'s str)> {
        let is_operation = |name: &str| self.config.store_operations.iter().any(|op| op == name);

        if is_operation(attribute) {
            if let Some(model) = bare_name(receiver, source) {
                return Some((model, attribute));
            }
        }

        let (inner, operation) = member_access(receiver, source)?;
        if is_operation(operation) {
            return bare_name(inner, source).map(|model| (model, operation));
        }

        None
    }

    fn external_call(&mut self, label: &str, verb: &str) {
        let entity = match self.graph.node_id(label) {
            Some(id) if self.graph.node(id).is(NodeKind::ExternalEntity) => id,
            Some(_) => {
                warn!("'{}' is already a non-external node; skipping {} call", label, verb);
                return;
            }
            None => self.graph.add_node(DfdNode::external_entity(label, "External Service")),
        };
        self.flow(entity, &verb.to_uppercase());
    }

    fn flow(&mut self, target: NodeId, label: &str) {
        self.graph.connect(self.process, target, label);
        self.flows += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::syntax::test_support::parse;
    use std::path::PathBuf;

    fn parsed(source: &str) -> ParsedSource {
        ParsedSource {
            path: PathBuf::from("views.py"),
            source: source.to_string(),
            tree: parse(source),
        }
    }

    fn trace(source: &str, use_case: &str, graph: &mut DfdGraph) -> Option<TraceOutcome> {
        let config = RecognizerConfig::default();
        let tracer = UseCaseTracer::new(&config, use_case).unwrap();
        tracer.trace_source(&parsed(source), graph)
    }

    fn flows_from(graph: &DfdGraph, process: &str) -> Vec<(String, String)> {
        let id = graph.node_id(process).unwrap();
        graph
            .outgoing(id)
            .map(|e| (graph.node(e.target).label.clone(), e.label.clone()))
            .collect()
    }

    #[test]
    fn test_parse_use_case() {
        assert_eq!(parse_use_case("GET /users"), Some(("GET", "/users")));
        assert_eq!(parse_use_case("POST /a b"), Some(("POST", "/a b")));
        assert_eq!(parse_use_case("GET"), None);
        assert_eq!(parse_use_case(" /users"), None);
    }

    #[test]
    fn test_links_known_stores_only() {
        let source = r#"
@app.route('/users', methods=['POST'])
def create_user():
    user = User(name='x')
    Audit.add(user)
    User.add(user)
    db.session.commit()
    Ghost.query.get(1)
    return User.query.filter_by(name='x').first()
"#;
        let mut graph = DfdGraph::default();
        graph.add_node(DfdNode::data_store("User", "SQLAlchemy Model: User"));

        let outcome = trace(source, "POST /users", &mut graph).unwrap();
        assert!(matches!(outcome, TraceOutcome::Traced { ref handler, flows: 2, .. } if handler == "create_user"));

        assert_eq!(
            flows_from(&graph, "POST /users"),
            vec![
                ("User".to_string(), "add".to_string()),
                ("User".to_string(), "query".to_string()),
            ]
        );
        assert!(graph.get_node_by_label("Audit").is_none());
        assert!(graph.get_node_by_label("Ghost").is_none());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_external_calls_create_entities() {
        let source = r#"
@app.route('/sync')
def sync():
    requests.get("https://api.example.com/x")
    requests.post(url, json={})
    requests.get(f"https://api.example.com/{id}")
    requests.head("https://api.example.com/x")
    requests.get("https://api.example.com/x")
"#;
        let mut graph = DfdGraph::default();
        trace(source, "GET /sync", &mut graph).unwrap();

        assert_eq!(
            flows_from(&graph, "GET /sync"),
            vec![
                ("https://api.example.com/x".to_string(), "GET".to_string()),
                ("External API".to_string(), "POST".to_string()),
                ("External API".to_string(), "GET".to_string()),
                ("https://api.example.com/x".to_string(), "GET".to_string()),
            ]
        );
        let entity = graph.get_node_by_label("https://api.example.com/x").unwrap();
        assert_eq!(entity.kind, NodeKind::ExternalEntity);
        assert_eq!(entity.description, "External Service");
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_scanned_clients_are_linked() {
        let source = r#"
@app.route('/pay', methods=['POST'])
def pay():
    return billing.post('/charge')
"#;
        let mut graph = DfdGraph::default();
        graph.add_node(DfdNode::external_entity("billing", "External client: requests.Session"));

        trace(source, "POST /pay", &mut graph).unwrap();
        assert_eq!(
            flows_from(&graph, "POST /pay"),
            vec![("billing".to_string(), "POST".to_string())]
        );
    }

    #[test]
    fn test_first_matching_handler_wins() {
        let source = r#"
@app.route('/dup')
def first():
    pass

@app.route('/dup')
def second():
    requests.get('https://late.example.com')
"#;
        let mut graph = DfdGraph::default();
        let outcome = trace(source, "GET /dup", &mut graph).unwrap();

        assert!(matches!(outcome, TraceOutcome::Traced { ref handler, flows: 0, .. } if handler == "first"));
        let process = graph.get_node_by_label("GET /dup").unwrap();
        assert_eq!(process.description, "Handler: first");
        assert_eq!(process.prop("location"), Some("views.py:3"));
    }

    #[test]
    fn test_verb_must_be_declared() {
        let source = "@app.route('/items', methods=['POST'])\ndef items():\n    pass\n";
        let mut graph = DfdGraph::default();

        assert!(trace(source, "GET /items", &mut graph).is_none());
        assert_eq!(graph.node_count(), 0);
        assert!(trace(source, "post /items", &mut graph).is_none());
        assert_eq!(graph.node_count(), 0);
        assert!(trace(source, "POST /items", &mut graph).is_some());
        assert_eq!(graph.labels(), vec!["POST /items"]);
    }
}
