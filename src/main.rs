//! dynamic-headers server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener ─▶ trace/timeout ─▶ route match ─▶ dynamic_header* ─▶ fixed response
//!                                                                       │
//!     Client Response                                                   │ append
//!     ◀──────────────────────────────────────────────────────── response headers
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use dynamic_headers::config::loader::{load_config, LoadError};
use dynamic_headers::observability::logging;
use dynamic_headers::{HttpServer, MiddlewareRegistry, Shutdown};

#[derive(Parser)]
#[command(name = "dynamic-headers")]
#[command(about = "Serve routes that copy request headers into response headers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "dynamic-headers.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = MiddlewareRegistry::default();

    let config = match load_config(&cli.config, &registry) {
        Ok(config) => config,
        Err(LoadError::Validation(errors)) => {
            eprintln!("{}: {} configuration error(s)", cli.config.display(), errors.len());
            for error in errors {
                eprintln!("  - {}", error);
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.check {
        println!("{}: configuration OK ({} routes)", cli.config.display(), config.routes.len());
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&config.observability.log_level);
    tracing::info!("dynamic-headers v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, &registry)?;
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
