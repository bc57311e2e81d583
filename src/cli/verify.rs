use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::narrative::CORPUS_SIZE;

/// Maximum number of missing keys listed before summarizing.
const MAX_LISTED_MISSING: usize = 20;

#[derive(Args, Debug, Clone)]
pub struct Verify {
    /// Content directory (overrides HAQEI_CONTENT_DIR)
    #[arg(long)]
    pub content_dir: Option<PathBuf>,
}

pub async fn run_verify_command(args: &Verify, config: EngineConfig) -> Result<()> {
    let mut config = super::with_content_dir(config, args.content_dir.as_ref());
    // Load leniently so every gap can be listed instead of just the first.
    config.strict_corpus = false;

    let engine = Engine::from_config(&config);
    let context = engine.context().await?;
    let missing = context.corpus().missing_keys(context.catalog());

    println!("Content: {}", config.content_dir.display());
    println!("  profiles:   {}", context.catalog().len());
    println!(
        "  narratives: {} of {} ({} missing)",
        CORPUS_SIZE - missing.len(),
        CORPUS_SIZE,
        missing.len()
    );

    if missing.is_empty() {
        println!("OK");
        return Ok(());
    }

    for key in missing.iter().take(MAX_LISTED_MISSING) {
        println!("  missing: {}", key);
    }
    if missing.len() > MAX_LISTED_MISSING {
        println!("  ... and {} more", missing.len() - MAX_LISTED_MISSING);
    }
    anyhow::bail!("narrative corpus is incomplete ({} missing)", missing.len())
}
