use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use haqei_core::cli::{Command, run_command};
use haqei_core::config::EngineConfig;

#[derive(Parser)]
#[command(
    name = "haqei",
    version,
    about = "Triple-role classification, compatibility and transformation trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("haqei_core=info,haqei=info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = EngineConfig::from_env()?;
    run_command(cli.command, config).await
}
