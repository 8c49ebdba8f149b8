// src/cli/check.rs — Startup diagnostics

use crate::core::answer::PromptTemplate;
use crate::infra::config::Config;
use crate::infra::paths;

use super::run::{ensure_model, ollama_provider, telegram_adapter};

/// Run every startup check, print a report, and fail if any check failed.
pub async fn run_check(config: &Config, config_path: Option<&str>) -> anyhow::Result<()> {
    println!("docqa check v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match config_path.map(std::path::PathBuf::from).or_else(paths::config_file_path) {
        Some(path) if path.exists() => println!("  Config:     {}", path.display()),
        _ => println!("  Config:     (using defaults)"),
    }
    println!("  Denylist:   {} phrase(s)", config.safety.denylist.len());

    let mut failures = 0;

    eprint!("  Prompt template... ");
    match PromptTemplate::from_config(&config.prompt) {
        Ok(_) if config.prompt.template.is_some() => eprintln!("ok (custom)"),
        Ok(_) => eprintln!("ok (built-in)"),
        Err(e) => {
            failures += 1;
            eprintln!("FAILED\n    {e}");
        }
    }

    eprint!("  Telegram... ");
    match telegram_adapter(config) {
        Ok(telegram) => match telegram.validate().await {
            Ok(who) => eprintln!("ok, {who}"),
            Err(e) => {
                failures += 1;
                eprintln!("FAILED\n    {e:#}");
            }
        },
        Err(e) => {
            failures += 1;
            eprintln!("FAILED\n    {e}");
        }
    }

    eprint!("  Ollama at {}... ", config.model.ollama_url);
    match ensure_model(&ollama_provider(config), &config.model.name).await {
        Ok(true) => eprintln!("ok, model {} installed", config.model.name),
        Ok(false) => eprintln!(
            "reachable, but model {} is missing (run `ollama pull {}`)",
            config.model.name, config.model.name
        ),
        Err(e) => {
            failures += 1;
            eprintln!("FAILED\n    {e}");
        }
    }

    println!();
    if failures > 0 {
        anyhow::bail!("{failures} check(s) failed");
    }
    println!("All checks passed.");
    Ok(())
}
