use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::OutputFormat;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::transformation::TransformationTree;

#[derive(Args, Debug, Clone)]
pub struct Tree {
    /// Starting hexagram id (1-64)
    pub hexagram: u8,

    /// Starting line position (1 = bottom, 6 = top)
    pub position: u8,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Content directory (overrides HAQEI_CONTENT_DIR)
    #[arg(long)]
    pub content_dir: Option<PathBuf>,
}

pub async fn run_tree_command(args: &Tree, config: EngineConfig) -> Result<()> {
    let config = super::with_content_dir(config, args.content_dir.as_ref());
    let engine = Engine::from_config(&config);
    let tree = engine.generate(args.hexagram, args.position).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        OutputFormat::Table => print_tree(&tree),
    }
    Ok(())
}

fn print_tree(tree: &TransformationTree) {
    println!(
        "{} {} (#{}, line {})\n",
        tree.root_name, tree.root_line_name, tree.root.hexagram_id, tree.root.line_position
    );
    for leaf in &tree.leaves {
        let path = leaf
            .path
            .iter()
            .map(|n| format!("{}:{}", n.hexagram_id, n.line_position))
            .collect::<Vec<_>>()
            .join(" -> ");
        println!(
            "  {}  {:<22} {} {}",
            leaf.code, path, leaf.final_name, leaf.final_line_name
        );
        println!("       {}", leaf.narrative.text);
    }
}
