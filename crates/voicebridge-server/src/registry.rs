//! Session Registry — the only structure shared across sessions.
//!
//! Touched only at session create/remove; the audio hot path never reaches
//! into the registry itself, only into the per-session controller it hands
//! out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use voicebridge_core::SessionController;

/// A registered session: its controller plus the wall-clock time it was
/// created, used to measure `connection_time_ms` when the media transport
/// later attaches.
#[derive(Clone)]
pub struct SessionRecord {
    pub controller: Arc<Mutex<SessionController>>,
    pub created_at: Instant,
}

/// Maps session ids to their controllers.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()) }
    }

    /// Create a new session and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let record = SessionRecord {
            controller: Arc::new(Mutex::new(SessionController::new())),
            created_at: Instant::now(),
        };
        self.sessions.write().await.insert(id, record);
        id
    }

    /// Look up a session's record without removing it.
    pub async fn get(&self, id: Uuid) -> Option<SessionRecord> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Remove and return a session's record, e.g. on `close_received` or a
    /// persistent transport failure.
    pub async fn remove(&self, id: Uuid) -> Option<SessionRecord> {
        self.sessions.write().await.remove(&id)
    }

    #[must_use]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        assert!(registry.get(id).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn remove_drops_the_session() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        assert!(registry.remove(id).await.is_some());
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn unknown_id_returns_none() {
        let registry = SessionRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }
}
