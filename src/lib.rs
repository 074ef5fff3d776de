pub mod analysis;
pub mod answers;
pub mod config;
pub mod cost;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod registry;
pub mod session;
pub mod suggestions;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host binary. Safe to call more than once —
/// later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("Sympta engine v{}", config::APP_VERSION);
}
