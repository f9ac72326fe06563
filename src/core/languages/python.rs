use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{DfdError, Result};
use super::LanguageParser;

/// Python-specific parser using Tree-sitter
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser.set_language(&python_language).map_err(|e| {
            DfdError::parser("<python>", format!("Failed to set Python language: {}", e))
        })?;

        Ok(Self { parser })
    }

    /// First error or missing node, in source order
    fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            return None;
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        children.into_iter().find_map(Self::first_error)
    }
}

impl LanguageParser for PythonParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<Tree> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| DfdError::parser(file_path, "Failed to parse Python code"))?;

        if let Some(error) = Self::first_error(tree.root_node()) {
            let position = error.start_position();
            return Err(DfdError::parser(
                file_path,
                format!(
                    "invalid syntax at line {}, column {}",
                    position.row + 1,
                    position.column + 1
                ),
            ));
        }

        Ok(tree)
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_valid_module() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser
            .parse("class User(db.Model):\n    pass\n", Path::new("models.py"))
            .unwrap();

        assert_eq!(tree.root_node().kind(), "module");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_syntax_error_is_reported_with_line() {
        let mut parser = PythonParser::new().unwrap();
        let err = parser
            .parse("x = 1\ndef broken(:\n    pass\n", Path::new("broken.py"))
            .unwrap_err();

        match err {
            DfdError::Parser { path, message } => {
                assert_eq!(path, Path::new("broken.py"));
                assert!(message.contains("invalid syntax"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
