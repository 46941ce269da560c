use crate::domain::repository::SessionStore;
use crate::domain::session::Session;
use crate::infrastructure::security::generate_session_id;
use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct SessionService<S: SessionStore> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: SessionStore> SessionService<S> {
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a fresh session for the user.
    #[instrument(skip(self))]
    pub async fn establish(&self, user_id: &str) -> Result<Session> {
        let session = Session::new(
            generate_session_id(),
            user_id.to_string(),
            Utc::now(),
            self.ttl,
        );
        self.store.set(session.clone()).await?;
        info!(expires_at = %session.expires_at, "Session established");
        Ok(session)
    }

    pub async fn resolve(&self, session_id: &str) -> Result<Option<Session>> {
        self.store.get(session_id, Utc::now()).await
    }

    /// Ends the session. Ending an unknown session is not an error.
    #[instrument(skip(self, session_id))]
    pub async fn end(&self, session_id: &str) -> Result<bool> {
        let removed = self.store.destroy(session_id).await?;
        debug!(removed, "Session ended");
        Ok(removed)
    }

    pub async fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now()).await
    }
}
