//! MattGPT server
//!
//! Entry point for the chat front end.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;

use mattgpt::config::AppConfig;
use mattgpt::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenv().ok();

    telemetry::init();

    let config = AppConfig::load()?;
    tracing::info!(
        name: "config.loaded",
        port = config.server.port,
        api_base_url = %config.api.base_url,
        rate_limit_enabled = config.resilience.rate_limit_enabled,
        "Configuration loaded"
    );

    server::start_server(Arc::new(config)).await
}
