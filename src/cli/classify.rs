use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::OutputFormat;
use crate::classifier::{Role, RoleAnswers, TripleClassification};
use crate::compatibility::CompatibilityReport;
use crate::config::EngineConfig;
use crate::engine::Engine;

/// Maximum size of an answers file (1 MiB).
const MAX_ANSWERS_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Args, Debug, Clone)]
pub struct Classify {
    /// JSON file with `engine`, `interface` and `safe_mode` answer lists
    pub answers: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Content directory (overrides HAQEI_CONTENT_DIR)
    #[arg(long)]
    pub content_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct ClassifyOutput {
    classification: TripleClassification,
    compatibility: CompatibilityReport,
}

pub async fn run_classify_command(args: &Classify, config: EngineConfig) -> Result<()> {
    let meta = tokio::fs::metadata(&args.answers)
        .await
        .with_context(|| format!("Failed to read {}", args.answers.display()))?;
    if meta.len() > MAX_ANSWERS_FILE_SIZE {
        anyhow::bail!(
            "{} is too large: {} bytes (max {} bytes)",
            args.answers.display(),
            meta.len(),
            MAX_ANSWERS_FILE_SIZE
        );
    }
    let raw = tokio::fs::read_to_string(&args.answers)
        .await
        .with_context(|| format!("Failed to read {}", args.answers.display()))?;
    let answers: RoleAnswers = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid answers file {}", args.answers.display()))?;

    let config = super::with_content_dir(config, args.content_dir.as_ref());
    let engine = Engine::from_config(&config);
    let classification = engine.classify_all(&answers).await?;
    let compatibility = engine
        .analyze(
            &classification.engine,
            &classification.interface,
            &classification.safe_mode,
        )
        .await?;

    let output = ClassifyOutput {
        classification,
        compatibility,
    };
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Table => print_output(&output),
    }
    Ok(())
}

fn print_output(output: &ClassifyOutput) {
    println!("Roles");
    for role in Role::ALL {
        let r = output.classification.get(role);
        println!(
            "  {:<10} #{:<2} {:<8} {:>6.2}%",
            role,
            r.profile.id(),
            r.profile.name(),
            r.match_percentage
        );
    }

    println!("\nCompatibility");
    for pair in &output.compatibility.pairs {
        println!(
            "  {:<9} {:<20} {:+.2}",
            pair.category,
            format!("{}/{}", pair.role_a, pair.role_b),
            pair.net_score
        );
        println!("            {}", pair.summary);
    }
    println!("\n{}", output.compatibility.overall_summary);
    println!(
        "Conflict level {:.2}{}",
        output.compatibility.conflict_level,
        if output.compatibility.high_synergy {
            " (high synergy)"
        } else {
            ""
        }
    );
}
