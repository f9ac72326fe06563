use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Tree};
use walkdir::WalkDir;

use crate::config::ParsingConfig;
use crate::error::{DfdError, Result};
use super::languages::{LanguageParser, PythonParser};

/// A source file together with its syntax tree
pub struct ParsedSource {
    /// File path as discovered
    pub path: PathBuf,

    /// Raw source text; tree nodes index into it
    pub source: String,

    pub tree: Tree,
}

impl ParsedSource {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// Discovers source files and parses them one at a time
pub struct SourceParser {
    config: ParsingConfig,
    language_parser: Box<dyn LanguageParser>,
}

impl SourceParser {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            language_parser: Box::new(PythonParser::new()?),
        })
    }

    /// Expand files and directories into the ordered list of source files.
    /// Directories are walked recursively in file-name order; anything that
    /// is neither a directory nor a recognized source file is ignored.
    pub fn expand_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in paths {
            let path = path.as_ref();

            if path.is_dir() {
                let walker = WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

                for entry in walker {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() && self.should_parse_file(entry.path()) => {
                            files.push(entry.into_path());
                        }
                        Ok(_) => {}
                        Err(e) => debug!("Skipping unreadable entry under {}: {}", path.display(), e),
                    }
                }
            } else if self.should_parse_file(path) {
                files.push(path.to_path_buf());
            } else {
                debug!("Ignoring {}: not a directory or source file", path.display());
            }
        }

        files
    }

    /// Read and parse a single source file
    pub fn parse_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<ParsedSource> {
        let path = file_path.as_ref();
        let source = std::fs::read_to_string(path)?;

        if source.len() > self.config.max_file_size {
            return Err(DfdError::parser(path, "file exceeds maximum size limit"));
        }

        let tree = self.language_parser.parse(&source, path)?;
        debug!("Parsed {} as {}", path.display(), self.language_parser.language_name());

        Ok(ParsedSource {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    /// Determine if a file should be parsed based on configuration
    fn should_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.language_parser.file_extensions().contains(&ext)
                    && self.config.extensions().contains(&ext)
            })
            .unwrap_or(false)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
