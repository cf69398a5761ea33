//! Server bootstrap — the composition root. This is the only place that
//! wires concrete infrastructure together for the Axum adapter.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::registry::SessionRegistry;
use crate::sse::SseBroadcaster;
use crate::state::AppContext;

/// CORS policy for the HTTP surface.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins — the default, suitable for the demo deployment.
    #[default]
    AllowAll,
    /// Allow only the listed origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration, overridable via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Defaults: bind `0.0.0.0`, port `8080`, CORS open.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self { bind: "0.0.0.0".to_string(), port: 8080, cors: CorsConfig::default() }
    }

    /// Apply `VOICEBRIDGE_BIND` / `VOICEBRIDGE_PORT` overrides, if set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("VOICEBRIDGE_BIND") {
            self.bind = bind;
        }
        if let Ok(port) = std::env::var("VOICEBRIDGE_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(err) => tracing::warn!(%err, value = %port, "ignoring invalid VOICEBRIDGE_PORT"),
            }
        }
        self
    }
}

/// Assemble the process-wide context: the session registry and the
/// observability broadcaster.
#[must_use]
pub fn bootstrap() -> AppContext {
    AppContext { registry: SessionRegistry::new(), sse: Arc::new(SseBroadcaster::with_defaults()) }
}

/// Bootstrap and serve until the process is terminated.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap();
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("voicebridge server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
