use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::routes::LOGIN_PATH;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, web};
use std::io::ErrorKind;
use tracing::{error, instrument};

/// Reads a pre-built HTML page from the static directory.
pub async fn serve_page(state: &AppState, file: &str) -> Result<HttpResponse, ApiError> {
    let path = state.static_dir.join(file);
    let html = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ApiError::NotFound(format!("Page not found: {}", file))
        } else {
            error!(path = %path.display(), error = %e, "Failed to read page");
            ApiError::Internal(format!("Failed to read page {}: {}", file, e))
        }
    })?;
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn index() -> HttpResponse {
    redirect(LOGIN_PATH)
}

#[instrument(skip(state))]
pub async fn dashboard(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    serve_page(&state, "dashboard.html").await
}

#[instrument(skip(state))]
pub async fn history(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    serve_page(&state, "history.html").await
}
