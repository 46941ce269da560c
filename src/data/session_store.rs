use crate::domain::repository::SessionStore;
use crate::domain::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Server-side session records keyed by session id.
#[derive(Clone)]
pub struct InMemorySessionStore {
    storage: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn set(&self, session: Session) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        let storage = self.storage.read().await;
        Ok(storage
            .get(id)
            .filter(|session| !session.is_expired(now))
            .cloned())
    }

    async fn destroy(&self, id: &str) -> Result<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.remove(id).is_some())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut storage = self.storage.write().await;
        let before = storage.len();
        storage.retain(|_, session| !session.is_expired(now));
        let purged = before - storage.len();
        debug!(purged, remaining = storage.len(), "Purged expired sessions");
        Ok(purged)
    }
}
