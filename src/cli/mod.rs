// src/cli/mod.rs — CLI definition (clap derive)

pub mod check;
pub mod extract;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docqa",
    about = "Telegram bot that answers questions about an uploaded document",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Ollama model name (overrides config and DOCQA_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama server URL (overrides config and OLLAMA_HOST)
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Default log level when neither DOCQA_LOG nor RUST_LOG is set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Start the bot (default)
    Run,
    /// Validate config, the Telegram token and the Ollama server, then exit
    Check,
    /// Print the text the bot would store for a local .txt or .docx file
    Extract {
        /// File to read
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["docqa"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(cli.model.is_none());
    }

    #[test]
    fn test_global_flags_and_extract() {
        let cli = Cli::try_parse_from([
            "docqa",
            "--model",
            "llama3.1",
            "--ollama-url",
            "http://gpu:11434",
            "extract",
            "notes.docx",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("llama3.1"));
        assert_eq!(cli.ollama_url.as_deref(), Some("http://gpu:11434"));
        assert!(matches!(cli.command, Some(Commands::Extract { ref path }) if path == "notes.docx"));
    }

    #[test]
    fn test_extract_requires_path() {
        assert!(Cli::try_parse_from(["docqa", "extract"]).is_err());
    }
}
