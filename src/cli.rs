use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use stackmap::Engine;

#[derive(Parser)]
#[command(name = "stackmap")]
#[command(about = "Recovers the implicit client/server contract of a source tree")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map layers, imports, env vars, routes and calls of a repository
    Architecture {
        /// Repository root (defaults to current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Report file (defaults to repo_architecture_report.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Infer the backend contract implied by frontend API calls
    Contract {
        /// Repository root (defaults to current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Report file (defaults to backend_contract.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default stackmap.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Architecture { root, output } => {
                engine.architecture(root, output).await.map(|_| ())
            }
            Commands::Contract { root, output } => {
                engine.contract(root, output).await.map(|_| ())
            }
            Commands::Init { path } => engine.init(path).await,
        }
    }
}
