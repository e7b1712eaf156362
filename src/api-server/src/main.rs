//! EduNet API Server
//!
//! Entry point for the franchise platform's REST API: org-scoped
//! subprogram and learning-group endpoints over the authorization engine.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (0.0.0.0:8080)
//! cargo run
//!
//! # Start on custom host and port
//! cargo run -- --host 127.0.0.1 --port 9090
//!
//! # Enable debug logging
//! RUST_LOG=debug cargo run
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (trace, debug, info, warn, error)
//! - `API_SERVER_HOST`: Server host (default: 0.0.0.0)
//! - `API_SERVER_PORT`: Server port (default: 8080)
//! - `API_SERVER_JSON_LOGS`: Emit JSON-structured logs

use anyhow::Result;
use clap::Parser;
use edunet_api_server::{
    server::{Server, ServerConfig},
    state::AppState,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// EduNet Franchise API Server
#[derive(Parser, Debug)]
#[command(
    name = "edunet-server",
    version,
    about = "REST API server for the EduNet franchise platform",
    long_about = None
)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "API_SERVER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "API_SERVER_PORT")]
    port: u16,

    /// Enable JSON logging format
    #[arg(long, env = "API_SERVER_JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);

    info!("Starting EduNet API Server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // In-memory backends; production deployments wire the directory and
    // stores to the real database behind the same traits.
    let state = AppState::default();
    info!("Application state initialized (in-memory backends)");

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    let server = Server::new(config, state);

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing/logging subsystem
fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "edunet_api_server={level},edunet_authz={level},tower_http=info",
            level = args.log_level
        )
        .into()
    });

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(vec!["edunet-server"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);
        assert!(!args.json_logs);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(vec![
            "edunet-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9090",
            "--json-logs",
        ]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 9090);
        assert!(args.json_logs);
    }
}
