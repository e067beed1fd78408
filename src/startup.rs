//! Startup helpers for the travel-plan agent server.

use std::process::ExitCode;

use crate::config::AgentConfig;
use crate::server::{self, AppState};

/// Run the server until shutdown.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting tourplan agent v{}", env!("CARGO_PKG_VERSION"));

    let config = match AgentConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let outcome = rt.block_on(async {
        let state = AppState::new(&config).await?;
        server::run_server(state, config.port).await
    });

    if let Err(e) = outcome {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
