// src/core/analysis/use_case_enumerator.rs
use crate::config::RecognizerConfig;
use crate::core::parser::ParsedSource;
use crate::core::syntax::{preorder, SyntaxKind};
use super::route_binding::route_bindings;

/// Lists the externally reachable entry points of a source file
pub struct UseCaseEnumerator<'c> {
    config: &'c RecognizerConfig,
}

impl<'c> UseCaseEnumerator<'c> {
    pub fn new(config: &'c RecognizerConfig) -> Self {
        Self { config }
    }

    /// `"VERB PATH"` ids in source order. Duplicates are kept.
    pub fn use_cases_in(&self, parsed: &ParsedSource) -> Vec<String> {
        let source = parsed.source.as_str();

        preorder(parsed.root())
            .into_iter()
            .filter(|node| SyntaxKind::of(*node) == SyntaxKind::FunctionDef)
            .flat_map(|function| route_bindings(function, source, self.config))
            .flat_map(|binding| binding.use_case_ids().collect::<Vec<_>>())
            .collect()
    }
}
