//! Binary entry point — the composition root.

use anyhow::Result;
use voicebridge_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::with_defaults().with_env_overrides();
    start_server(config).await
}
