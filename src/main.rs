//! Daily English web server.
//!
//! Usage:
//!   daily-english [--host <addr>] [--port <n>] [--model <id>] [--secrets-file <path>]
//!
//! Every flag falls back to its `DAILY_ENGLISH_*` environment variable, then
//! to the built-in default. Set `GEMINI_API_KEY` (environment, secrets file or
//! OS keyring) to skip the key prompt in the browser.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use daily_english::{AppConfig, WebServer};

#[derive(Debug, Parser)]
#[command(name = "daily-english", version, about = "Everyday English dialogues with Korean notes, powered by Gemini")]
struct Cli {
    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    port: Option<u16>,

    /// Gemini model identifier
    #[arg(long)]
    model: Option<String>,

    /// YAML file holding GEMINI_API_KEY
    #[arg(long)]
    secrets_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(path) = self.secrets_file {
            config.secrets_file = path;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env().context("invalid environment configuration")?);
    config.validate().context("invalid configuration")?;

    let server = WebServer::from_config(config).context("failed to initialise server")?;
    server.serve().await.context("server error")?;
    Ok(())
}
