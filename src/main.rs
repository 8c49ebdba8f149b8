// src/main.rs — docqa entry point

use clap::Parser;

use docqa::cli::{Cli, Commands};
use docqa::core::safety::ContentFilter;
use docqa::infra::config::Config;
use docqa::infra::logger;

#[tokio::main]
async fn main() {
    // A .env file in the working directory is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))
            .map_err(|e| anyhow::anyhow!("failed to load {path}: {e}"))?
    } else {
        Config::load()?
    };
    config.apply_env();
    config.apply_cli(cli.model.as_deref(), cli.ollama_url.as_deref());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => docqa::cli::run::run_bot(&config).await,
        Commands::Check => docqa::cli::check::run_check(&config, cli.config.as_deref()).await,
        Commands::Extract { path } => {
            docqa::cli::extract::run_extract(&path, &ContentFilter::from_config(&config.safety))
        }
    }
}
