use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<String, User>,
    // normalized email -> user id
    by_email: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, email = %user.email))]
    async fn insert_user(&self, user: User) -> Result<bool> {
        trace!("Acquiring write lock for user table");
        let mut table = self.table.write().await;
        if table.by_email.contains_key(&user.email) {
            debug!("Email already registered");
            return Ok(false);
        }
        table.by_email.insert(user.email.clone(), user.id.clone());
        table.by_id.insert(user.id.clone(), user);
        debug!(users = table.by_id.len(), "User stored");
        Ok(true)
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let table = self.table.read().await;
        let user = table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned();
        if user.is_none() {
            trace!("No user with this email");
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.table.read().await.by_id.get(id).cloned())
    }
}
