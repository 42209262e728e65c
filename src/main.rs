//! Treehole export CLI entrypoint.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;
use treehole_export::{ExportConfig, TreeholeError};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), TreeholeError> {
    let config = load_config()?;
    cli::export_thread::run(&config).await
}

/// Installs the stderr log subscriber, honouring `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`TreeholeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ExportConfig, TreeholeError> {
    ExportConfig::load().map_err(|error| TreeholeError::Configuration {
        message: error.to_string(),
    })
}
