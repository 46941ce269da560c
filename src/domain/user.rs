use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, FieldError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Identity attached to a request once its session has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateUser {
    /// Checks the registration form and returns the normalized email and
    /// display name.
    pub fn validate(&self) -> Result<(String, String), DomainError> {
        let email = normalize_email(&self.email);
        let mut errors = Vec::new();

        if email.is_empty() {
            errors.push(FieldError::new("email", "email is required"));
        } else if !has_local_and_domain(&email) {
            errors.push(FieldError::new("email", "email must be a valid address"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "password is required"));
        }

        if !errors.is_empty() {
            return Err(DomainError::InvalidFields(errors));
        }

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok((email, name))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn has_local_and_domain(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
