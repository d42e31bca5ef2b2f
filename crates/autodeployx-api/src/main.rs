//! `autodeployx-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::Result;

use autodeployx_api::config::Config;
use autodeployx_api::server::Server;
use autodeployx_core::observability::{LogFormat, init_logging};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(choose_log_format(&config));

    tracing::info!(
        jenkins = %config.jenkins.base_url,
        repository = %config.registry.repository_path(),
        "Collaborators configured"
    );

    let server = Server::new(config);
    server.serve().await?;
    Ok(())
}
