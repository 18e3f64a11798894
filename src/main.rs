mod chart;
mod cmd;
mod config;
mod error;
mod progress;
mod registry;
mod server;
mod service;
#[cfg(test)]
mod testutil;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "helm-images")]
#[command(about = "Find container images in Helm values files and look up their sizes")]
#[command(version)]
struct Cli {
    /// Registry API base URL [env: REGISTRY_URL, default: https://hub.docker.com]
    #[arg(long, global = true)]
    registry_url: Option<String>,

    /// Timeout in seconds for every outbound request [env: HTTP_TIMEOUT_SECS, default: 30]
    #[arg(long, global = true)]
    http_timeout: Option<u64>,

    /// Fail when the document URL answers with a non-2xx status [env: STRICT_FETCH]
    #[arg(long, global = true)]
    strict_fetch: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Listen port [env: PORT, default: 8080]
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Scan a single document URL and print its images
    Scan {
        /// URL of the YAML document
        url: String,

        /// Output as JSON (optionally to a file)
        #[arg(long, num_args = 0..=1, default_missing_value = "-")]
        json: Option<String>,
    },
}

impl Cli {
    /// Environment first, flags on top.
    fn config(&self) -> Result<AppConfig> {
        let mut cfg = AppConfig::from_env()?;
        if let Some(url) = &self.registry_url {
            cfg.registry_url = url.clone();
        }
        if let Some(secs) = self.http_timeout {
            cfg.http_timeout = std::time::Duration::from_secs(secs);
        }
        if self.strict_fetch {
            cfg.strict_fetch = true;
        }
        if let Some(Commands::Serve { port: Some(port) }) = &self.command {
            cfg.port = *port;
        }
        Ok(cfg)
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.config()?;

    match &cli.command {
        Some(Commands::Scan { url, json }) => {
            init_tracing("warn");
            cmd::scan::run(url, json.as_deref(), &cfg).await?;
        }
        Some(Commands::Serve { .. }) | None => {
            init_tracing("info");
            cmd::serve::run(&cfg).await?;
        }
    }

    Ok(())
}
