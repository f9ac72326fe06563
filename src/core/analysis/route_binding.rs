// src/core/analysis/route_binding.rs
use tree_sitter::Node;

use crate::config::RecognizerConfig;
use crate::core::syntax::{
    call_function, decorators, keyword_arg, member_access, positional_args, string_literal,
    string_sequence, SyntaxKind,
};

/// A handler's declared path and verbs, read from one route decorator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    pub path: String,
    /// Upper-cased HTTP verbs
    pub verbs: Vec<String>,
}

impl RouteBinding {
    /// One `"VERB PATH"` id per verb, in declaration order
    pub fn use_case_ids(&self) -> impl Iterator<Item = String> + '_ {
        self.verbs.iter().map(move |verb| format!("{} {}", verb, self.path))
    }

    pub fn matches(&self, verb: &str, path: &str) -> bool {
        self.path == path && self.verbs.iter().any(|v| v == verb)
    }
}

/// Route bindings declared on a function, top decorator first
pub fn route_bindings(function: Node, source: &str, config: &RecognizerConfig) -> Vec<RouteBinding> {
    decorators(function)
        .into_iter()
        .filter_map(|decorator| route_binding(decorator, source, config))
        .collect()
}

/// `@<obj>.<route>("<path>", methods=[...])`. Anything non-literal where a literal
/// is required means the decorator is not a binding.
fn route_binding(decorator: Node, source: &str, config: &RecognizerConfig) -> Option<RouteBinding> {
    if SyntaxKind::of(decorator) != SyntaxKind::Call {
        return None;
    }

    let (_, attribute) = member_access(call_function(decorator)?, source)?;
    if attribute != config.route_attribute {
        return None;
    }

    let path = positional_args(decorator)
        .first()
        .and_then(|arg| string_literal(*arg, source))?;

    let verbs = match keyword_arg(decorator, &config.methods_keyword, source) {
        Some(value) => string_sequence(value, source)?,
        None => config.default_methods.clone(),
    };

    Some(RouteBinding {
        path,
        verbs: verbs.iter().map(|verb| verb.to_uppercase()).collect(),
    })
}
