//! Shared application state type.

use std::sync::Arc;

use crate::registry::SessionRegistry;
use crate::sse::SseBroadcaster;

/// Everything a handler needs, shared across the process.
pub struct AppContext {
    pub registry: SessionRegistry,
    pub sse: Arc<SseBroadcaster>,
}

/// Application state injected into every handler via axum's `State` extractor.
pub type AppState = Arc<AppContext>;
