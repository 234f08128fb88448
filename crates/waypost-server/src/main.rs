//! Waypost server
//!
//! HTTP service for saved addresses.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use waypost_core::{BackendKind, Config};

mod error;
mod routes;
mod server;
mod state;

/// Used when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "waypost=info,waypost_core=info,tower_http=info";

#[derive(Parser)]
#[command(name = "waypost")]
#[command(about = "Waypost - saved addresses with coordinates")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/waypost/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage backend (memory or sqlite)
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Directory for the SQLite database
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl Cli {
    /// Config file and environment first, then flags on top
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).init();

    let config = cli.load_config()?;
    server::run(config).await
}
