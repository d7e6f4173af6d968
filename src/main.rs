//! Assessment scoring server binary entry point.
//!
//! Serves the line protocol over stdio. All logs go to stderr; stdout is
//! reserved for response lines.
//!
//! Coverage is excluded because the main function only wires stdio and
//! process exit codes around [`ScoringServer::run_stdio`].

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use assessment_scoring::config::Config;
use assessment_scoring::server::ScoringServer;
use tracing_subscriber::EnvFilter;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Load configuration first so LOG_LEVEL and LOG_FORMAT from .env apply
    let config = Config::from_env();
    let (log_level, log_json) = config
        .as_ref()
        .map_or_else(|_| ("info".to_string(), false), |c| (c.log_level.clone(), c.log_json));

    let filter = log_level
        .parse()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::info!("assessment-scoring starting...");

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Configuration loaded: database={}, max_retries={}, busy_timeout={}ms",
        config.database_path,
        config.max_retries,
        config.busy_timeout_ms
    );

    let server = ScoringServer::new(config);
    if let Err(e) = server.run_stdio().await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("assessment-scoring shutdown complete");
}
