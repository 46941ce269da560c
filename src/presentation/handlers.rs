use crate::application::auth_service::AuthService;
use crate::application::service::ExpenseService;
use crate::application::session_service::SessionService;
use crate::data::memory::InMemoryExpenseRepository;
use crate::data::session_store::InMemorySessionStore;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::{DomainError, FieldError};
use crate::domain::models::{CreateExpense, ExpenseQuery, UpdateExpense};
use crate::infrastructure::config::{AppConfig, StartupError};
use crate::infrastructure::storage::Storage;
use crate::presentation::session::{AuthenticatedUser, SessionCookies};
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the services
pub struct AppState {
    pub expenses: ExpenseService<InMemoryExpenseRepository>,
    pub auth: AuthService<InMemoryUserRepository>,
    pub sessions: SessionService<InMemorySessionStore>,
    pub cookies: SessionCookies,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        storage: Storage,
        cookies: SessionCookies,
        session_ttl: chrono::Duration,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            expenses: ExpenseService::new(Arc::new(storage.expenses)),
            auth: AuthService::new(Arc::new(storage.users)),
            sessions: SessionService::new(Arc::new(storage.sessions), session_ttl),
            cookies,
            static_dir: static_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig, storage: Storage) -> Result<Self, StartupError> {
        let cookies = SessionCookies::new(
            &config.session_secret,
            config.environment.is_production(),
        )?;
        Ok(Self::new(
            storage,
            cookies,
            config.session_ttl,
            config.static_dir.clone(),
        ))
    }
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid email or password")]
    AuthenticationFailed,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation { message, fields } if fields.is_empty() => {
                serde_json::json!({ "message": message })
            }
            ApiError::Validation { message, fields } => {
                serde_json::json!({ "message": message, "fields": fields })
            }
            ApiError::NotFound(msg) | ApiError::Unauthorized(msg) | ApiError::Conflict(msg) => {
                serde_json::json!({ "message": msg })
            }
            ApiError::AuthenticationFailed => {
                serde_json::json!({ "message": "Invalid email or password" })
            }
            // Server-side detail stays in the logs
            ApiError::Storage(_) | ApiError::Internal(_) => {
                serde_json::json!({ "message": "Something went wrong" })
            }
        };

        if status.is_server_error() {
            error!(error = %error_msg, status = %status, "Request failed");
        } else {
            warn!(error = %error_msg, status = %status, "Request rejected");
        }

        let error_response = ErrorResponse {
            error: if status.is_server_error() {
                "Internal server error".to_string()
            } else {
                error_msg
            },
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::validation(msg.clone()),
            Some(DomainError::InvalidFields(fields)) => ApiError::Validation {
                message: "One or more fields are invalid".to_string(),
                fields: fields.clone(),
            },
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::InvalidCredentials) => ApiError::AuthenticationFailed,
            Some(DomainError::Conflict(msg)) => ApiError::Conflict(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Storage(err.to_string()),
        }
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[derive(Serialize)]
struct DeletedResponse {
    message: &'static str,
    id: String,
}

#[instrument(skip(state, user, query), fields(user_id = %user.id()))]
pub async fn list_expenses(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<ExpenseQuery>,
) -> Result<HttpResponse, ApiError> {
    let expenses = state
        .expenses
        .list_expenses(user.id(), &query)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list expenses");
            e
        })?;
    info!(count = expenses.len(), "Expenses retrieved");
    Ok(HttpResponse::Ok().json(expenses))
}

#[instrument(skip(state, user, req), fields(user_id = %user.id(), expense_id))]
pub async fn create_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateExpense>,
) -> Result<HttpResponse, ApiError> {
    let expense = state
        .expenses
        .create_expense(user.id(), req.into_inner())
        .await?;
    tracing::Span::current().record("expense_id", expense.id.as_str());
    info!(amount = expense.amount, category = %expense.category, "Expense created successfully");
    Ok(HttpResponse::Created().json(expense))
}

#[instrument(skip(state, user), fields(user_id = %user.id(), expense_id = %*path))]
pub async fn get_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let expense = state.expenses.get_expense(user.id(), &path).await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[instrument(skip(state, user, req), fields(user_id = %user.id(), expense_id = %*path))]
pub async fn update_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<UpdateExpense>,
) -> Result<HttpResponse, ApiError> {
    let expense = state
        .expenses
        .update_expense(user.id(), &path, req.into_inner())
        .await?;
    info!(amount = expense.amount, "Expense updated successfully");
    Ok(HttpResponse::Ok().json(expense))
}

#[instrument(skip(state, user), fields(user_id = %user.id(), expense_id = %*path))]
pub async fn delete_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    state.expenses.delete_expense(user.id(), &id).await?;
    info!("Expense deleted successfully");
    Ok(HttpResponse::Ok().json(DeletedResponse {
        message: "Expense deleted",
        id,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn expense_summary(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let summary = state.expenses.summarize(user.id()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
