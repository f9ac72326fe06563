use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use dfdscan::core::Engine;

#[derive(Parser)]
#[command(name = "dfdscan")]
#[command(about = "Reconstruct a data flow diagram from Python web application source")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target file (defaults to ./dfdscan.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Discover data stores and external clients
    Components {
        /// Source files or directories (defaults to configured source dirs)
        paths: Vec<PathBuf>,

        /// Write the graph as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List route-bound use cases as "VERB PATH"
    UseCases {
        /// Source files or directories (defaults to configured source dirs)
        paths: Vec<PathBuf>,

        /// Drop repeated use cases
        #[arg(long)]
        unique: bool,
    },

    /// Trace one use case into the component graph
    Trace {
        /// Use case, e.g. "GET /users"
        use_case: String,

        /// Source files or directories (defaults to configured source dirs)
        paths: Vec<PathBuf>,

        /// Write the graph as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scan, enumerate and trace every use case
    Analyze {
        /// Source files or directories (defaults to configured source dirs)
        paths: Vec<PathBuf>,

        /// Write the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => engine.init(path),
            Commands::Components { paths, output } => engine.components(paths, output),
            Commands::UseCases { paths, unique } => engine.use_cases(paths, unique),
            Commands::Trace { use_case, paths, output } => engine.trace(paths, &use_case, output),
            Commands::Analyze { paths, output } => engine.analyze(paths, output),
        }
    }
}
