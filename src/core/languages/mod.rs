//! Language-specific parsers
//!
//! Each language gets its own module with a consistent interface for turning
//! source text into a syntax tree the recognizers can walk.

mod python;

pub use python::PythonParser;

use std::path::Path;
use tree_sitter::Tree;

use crate::error::Result;

/// Trait that all language parsers must implement
pub trait LanguageParser {
    /// Parse source code into a syntax tree.
    /// A tree containing syntax errors is reported as `DfdError::Parser`.
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<Tree>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
