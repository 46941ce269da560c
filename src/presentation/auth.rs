use crate::domain::user::{CreateUser, CurrentUser, LoginRequest, User};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::pages::{redirect, serve_page};
use crate::presentation::routes::{DASHBOARD_PATH, LOGIN_PATH, REGISTER_PATH};
use crate::presentation::session::RequestContext;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{Either, HttpResponse, web};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Login and registration accept a JSON body or an HTML form post.
type JsonOrForm<T> = Either<web::Json<T>, web::Form<T>>;

fn unpack<T>(body: JsonOrForm<T>) -> (T, bool) {
    match body {
        Either::Left(json) => (json.into_inner(), false),
        Either::Right(form) => (form.into_inner(), true),
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionInfoResponse {
    pub authenticated: bool,
    pub user: Option<CurrentUser>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[instrument(skip(state, context))]
pub async fn login_page(
    state: web::Data<AppState>,
    context: RequestContext,
) -> Result<HttpResponse, ApiError> {
    if context.is_authenticated() {
        return Ok(redirect(DASHBOARD_PATH));
    }
    serve_page(&state, "login.html").await
}

#[instrument(skip(state, context, body))]
pub async fn login(
    state: web::Data<AppState>,
    context: RequestContext,
    body: JsonOrForm<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let (req, from_form) = unpack(body);
    info!(email = %req.email, "Login request received");

    let user = match state.auth.authenticate(req).await {
        Ok(user) => user,
        Err(e) if from_form => return back_to_form(LOGIN_PATH, e.into()),
        Err(e) => return Err(e.into()),
    };

    // A client that logs in again gets a fresh session id.
    if let Some(previous) = context.session_id.as_deref() {
        state.sessions.end(previous).await?;
    }
    let session = state.sessions.establish(&user.id).await.map_err(|e| {
        error!(error = %e, "Failed to establish session");
        e
    })?;
    let cookie = state.cookies.session_cookie(&session, state.sessions.ttl())?;

    info!(user_id = %user.id, "Login successful");
    if from_form {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, DASHBOARD_PATH))
            .cookie(cookie)
            .finish());
    }
    Ok(HttpResponse::Ok().cookie(cookie).json(UserResponse::from(&user)))
}

async fn end_session(
    state: &AppState,
    context: &RequestContext,
) -> Result<Cookie<'static>, ApiError> {
    if let Some(session_id) = context.session_id.as_deref() {
        state.sessions.end(session_id).await?;
        info!("Logged out");
    }
    Ok(state.cookies.removal_cookie())
}

/// `GET /logout`: ends the session and sends the browser to the login page.
#[instrument(skip(state, context))]
pub async fn logout_page(
    state: web::Data<AppState>,
    context: RequestContext,
) -> Result<HttpResponse, ApiError> {
    let removal = end_session(&state, &context).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(removal)
        .finish())
}

/// `POST /logout`: idempotent, succeeds with or without a live session.
#[instrument(skip(state, context))]
pub async fn logout(
    state: web::Data<AppState>,
    context: RequestContext,
) -> Result<HttpResponse, ApiError> {
    let removal = end_session(&state, &context).await?;
    Ok(HttpResponse::Ok().cookie(removal).json(MessageResponse {
        message: "Logged out",
    }))
}

#[instrument(skip(state))]
pub async fn register_page(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    serve_page(&state, "register.html").await
}

#[instrument(skip(state, body))]
pub async fn register(
    state: web::Data<AppState>,
    body: JsonOrForm<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    let (req, from_form) = unpack(body);
    info!(email = %req.email, "Registration request received");

    let user = match state.auth.register_user(req).await {
        Ok(user) => user,
        Err(e) if from_form => return back_to_form(REGISTER_PATH, e.into()),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "User registered successfully");
    if from_form {
        return Ok(redirect_see_other(LOGIN_PATH));
    }
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

pub async fn session_info(context: RequestContext) -> HttpResponse {
    HttpResponse::Ok().json(SessionInfoResponse {
        authenticated: context.is_authenticated(),
        user: context.current_user,
    })
}

/// Sends a failed form post back to its page with an error code the page
/// script can show. Server errors are still answered with the JSON body.
fn back_to_form(page: &str, err: ApiError) -> Result<HttpResponse, ApiError> {
    let code = match err {
        ApiError::AuthenticationFailed => "invalid_credentials",
        ApiError::Conflict(_) => "email_taken",
        ApiError::Validation { .. } => "invalid_input",
        other => return Err(other),
    };
    warn!(error = %err, code, "Form submission rejected");
    Ok(redirect_see_other(&format!("{}?error={}", page, code)))
}

fn redirect_see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
