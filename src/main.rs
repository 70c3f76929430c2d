//! minimux server binary.
//!
//! ```text
//! minimux [--config PATH]
//!     → config (TOML file or defaults, APP_ENV / PORT overrides)
//!     → observability (logging, optional Prometheus exporter)
//!     → routing (table + default middleware, GET /healthcheck)
//!     → HttpTransport (bind)
//!     → graceful shutdown on SIGINT / SIGTERM
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use minimux::config::{self, ServerConfig};
use minimux::lifecycle::startup;
use minimux::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "minimux", version, about = "Embeddable HTTP request router")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: ServerConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::from_env()?,
    };

    logging::init(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "minimux starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        shutdown_timeout_secs = config.shutdown.timeout_secs,
        "Configuration loaded"
    );

    let router = Arc::new(startup::build_router(&config)?);

    match startup::run(&config, router).await {
        Ok(()) => {
            tracing::info!("minimux stopped");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "minimux stopped with errors");
            Err(e.into())
        }
    }
}
