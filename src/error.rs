use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dfdscan operations
#[derive(Error, Debug)]
pub enum DfdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error in {path}: {message}")]
    Parser { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DfdError {
    pub fn parser(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parser {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DfdError>;
