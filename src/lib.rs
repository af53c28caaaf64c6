pub mod analytics;
pub mod config;
pub mod export;
pub mod ingest;
pub mod models;
pub mod snapshot;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the embedding dashboard process.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("oncodash analytics core v{}", config::APP_VERSION);
}
