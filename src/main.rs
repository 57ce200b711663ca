//! # PRAXIS CLI (`praxis`)
//!
//! ## Usage
//!
//! ```bash
//! praxis --config ./config/praxis.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `praxis serve` | Load the knowledge base and start the HTTP API (default) |
//! | `praxis ask "<question>"` | Answer one question and exit |
//! | `praxis chunks` | Print the chunks the document splits into |
//!
//! The generation API key is read from `GOOGLE_API_KEY` (or the variable
//! named by `[generation].api_key_env`). `serve` and `ask` refuse to start
//! without it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use praxis::{build_assistant, chunk, config, server};

/// PRAXIS: a retrieval-augmented chat backend for a personal portfolio.
#[derive(Parser)]
#[command(name = "praxis", version)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is missing.
    #[arg(long, global = true, env = "PRAXIS_CONFIG", default_value = "./config/praxis.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `GET /`, `GET /health` and
    /// `POST /api/chat`.
    Serve,

    /// Answer a single question and print the reply.
    Ask {
        /// The question, as a user would type it.
        question: String,
    },

    /// List the chunks the knowledge document splits into.
    ///
    /// Needs neither the API key nor the embedding model.
    Chunks,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,praxis=info",
        1 => "info,praxis=debug",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let assistant = Arc::new(build_assistant(&cfg)?);
            server::run_server(&cfg, assistant).await?;
        }
        Commands::Ask { question } => {
            let assistant = build_assistant(&cfg)?;
            let reply = assistant.reply(&question).await;
            println!("{}", reply.text);
        }
        Commands::Chunks => {
            let chunks = chunk::load_chunks(&cfg.knowledge.path, &cfg.knowledge.separator)?;
            for c in &chunks {
                println!("--- [{}] ({} chars)", c.index, c.text.chars().count());
                println!("{}", c.text);
            }
            println!();
            println!("{} chunks", chunks.len());
        }
    }

    Ok(())
}
