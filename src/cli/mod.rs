//! Command-line commands for the `haqei` binary.

mod classify;
mod tree;
mod verify;

pub use classify::{Classify, run_classify_command};
pub use tree::{Tree, run_tree_command};
pub use verify::{Verify, run_verify_command};

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::EngineConfig;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load the content directory and report catalog and corpus completeness
    Verify(Verify),

    /// Print the transformation tree for a starting hexagram and line
    ///
    /// The content directory must hold `narratives.json` next to `catalog.toml`.
    /// Only `catalog.toml` ships in `data/`; supply a corpus with all 3072
    /// entries, or set HAQEI_STRICT_CORPUS=false to accept a partial one.
    Tree(Tree),

    /// Classify role answers from a JSON file and analyze compatibility
    ///
    /// Loading needs `narratives.json` in the content directory even though
    /// classification does not read it. Only `catalog.toml` ships in `data/`;
    /// supply a corpus, or set HAQEI_STRICT_CORPUS=false to accept a partial one.
    Classify(Classify),
}

/// Output format for commands that print results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub async fn run_command(command: Command, config: EngineConfig) -> anyhow::Result<()> {
    match command {
        Command::Verify(args) => run_verify_command(&args, config).await,
        Command::Tree(args) => run_tree_command(&args, config).await,
        Command::Classify(args) => run_classify_command(&args, config).await,
    }
}

/// Apply a `--content-dir` override on top of the loaded configuration.
fn with_content_dir(mut config: EngineConfig, content_dir: Option<&PathBuf>) -> EngineConfig {
    if let Some(dir) = content_dir {
        config.content_dir = dir.clone();
    }
    config
}
