use crate::domain::models::Expense;
use crate::domain::session::Session;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Expense storage. Every lookup is scoped by owner id.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn insert(&self, expense: Expense) -> Result<()>;
    async fn find_for_owner(&self, owner_id: &str, id: &str) -> Result<Option<Expense>>;
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Expense>>;
    /// Returns `false` when no record with that id belongs to the owner.
    async fn replace(&self, expense: Expense) -> Result<bool>;
    async fn delete_for_owner(&self, owner_id: &str, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user unless the email is taken. Returns `false` on conflict.
    async fn insert_user(&self, user: User) -> Result<bool>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, session: Session) -> Result<()>;
    /// Returns the session only while it is unexpired at `now`.
    async fn get(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Session>>;
    /// Returns whether a session was removed.
    async fn destroy(&self, id: &str) -> Result<bool>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}
