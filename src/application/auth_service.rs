use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{CreateUser, LoginRequest, User, normalize_email};
use crate::infrastructure::security::{hash_password, verify_password};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>) -> Self {
        Self { user_repository }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register_user(&self, req: CreateUser) -> Result<User> {
        trace!("Starting user registration");
        let (email, name) = req.validate()?;

        if self.user_repository.find_user_by_email(&email).await?.is_some() {
            warn!(email = %email, "User already exists");
            return Err(email_taken().into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            password_hash,
            created_at: Utc::now(),
        };

        debug!(user_id = %user.id, "Saving user to repository");
        // A concurrent registration may have claimed the email since the check above.
        if !self.user_repository.insert_user(user.clone()).await? {
            warn!(email = %user.email, "User already exists");
            return Err(email_taken().into());
        }

        info!(user_id = %user.id, email = %user.email, "User registered successfully");
        Ok(user)
    }

    /// Verifies credentials. Unknown email and wrong password produce the
    /// same error.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn authenticate(&self, req: LoginRequest) -> Result<User> {
        trace!("Starting login");
        let email = normalize_email(&req.email);

        let user = self
            .user_repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("User not found during login");
                DomainError::InvalidCredentials
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "Credentials verified");
        Ok(user)
    }

    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        self.user_repository.find_user_by_id(user_id).await
    }
}

fn email_taken() -> DomainError {
    DomainError::Conflict("User with this email already exists".to_string())
}
