use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{DfdError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    #[serde(default)]
    pub project: ProjectConfig,

    /// Source code parsing configuration
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Markers used to recognize stores, clients, routes and calls
    #[serde(default)]
    pub recognizers: RecognizerConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name given to the resulting diagram
    pub name: String,

    /// Source directories analyzed when no paths are given
    pub source_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Language name to file extension
    pub file_extensions: HashMap<String, String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

/// Heuristic markers. Matching is by simple name, never by import resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Bare base-class names marking a persistence model (`class User(Model)`)
    pub store_base_names: Vec<String>,

    /// Member-access base attributes marking a persistence model (`db.Model`)
    pub store_base_attributes: Vec<String>,

    /// Value of the `type` property on discovered stores
    pub store_kind: String,

    /// Modules whose constructors build external clients (`requests`)
    pub client_modules: Vec<String>,

    /// Client constructor attributes (`Session`)
    pub client_constructors: Vec<String>,

    /// Decorator attribute binding a handler to a route (`app.route`)
    pub route_attribute: String,

    /// Keyword argument listing the HTTP verbs of a route
    pub methods_keyword: String,

    /// Verbs assumed when the route names none
    pub default_methods: Vec<String>,

    /// Member calls on a model that count as store access
    pub store_operations: Vec<String>,

    /// Modules whose verb calls are outbound HTTP (`requests.get`)
    pub http_modules: Vec<String>,

    /// Lower-case HTTP verb attributes
    pub http_verbs: Vec<String>,

    /// Entity label used when the call has no literal URL
    pub external_fallback_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Flask App Analysis".to_string(),
            source_dirs: vec![PathBuf::from(".")],
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        let mut file_extensions = HashMap::new();
        file_extensions.insert("python".to_string(), "py".to_string());

        Self {
            file_extensions,
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            store_base_names: strings(&["Model"]),
            store_base_attributes: strings(&["Model"]),
            store_kind: "SQLAlchemy Model".to_string(),
            client_modules: strings(&["requests"]),
            client_constructors: strings(&["Session"]),
            route_attribute: "route".to_string(),
            methods_keyword: "methods".to_string(),
            default_methods: strings(&["GET"]),
            store_operations: strings(&["query", "add", "commit", "delete"]),
            http_modules: strings(&["requests"]),
            http_verbs: strings(&["get", "post", "put", "delete", "patch"]),
            external_fallback_label: "External API".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl ParsingConfig {
    /// Extensions of all configured source languages
    pub fn extensions(&self) -> Vec<&str> {
        self.file_extensions.values().map(String::as_str).collect()
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| DfdError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DfdError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["dfdscan.toml", "Dfdscan.toml", ".dfdscan.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
