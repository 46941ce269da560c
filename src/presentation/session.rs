//! Per-request identity and the session cookie.
//!
//! `SessionMiddleware` resolves a `RequestContext` for every request and
//! stores it in the request extensions. Handlers read it back through the
//! `RequestContext` and `AuthenticatedUser` extractors.

use crate::domain::session::Session;
use crate::domain::user::CurrentUser;
use crate::infrastructure::config::StartupError;
use crate::infrastructure::security::{derive_cookie_key, sign_cookie, verify_cookie};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use std::future::{Ready, ready};
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "expense_sid";

/// Explicit per-request state produced by the session middleware.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub session_id: Option<String>,
    pub current_user: Option<CurrentUser>,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(req
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default()))
    }
}

/// Extractor that rejects the request with 401 unless an identity is attached.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(CurrentUser);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<RequestContext>()
            .and_then(|context| context.current_user.clone());
        ready(
            user.map(AuthenticatedUser)
                .ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string())),
        )
    }
}

/// Signing key and attributes for the session cookie.
#[derive(Clone)]
pub struct SessionCookies {
    key: Key,
    secure: bool,
}

impl SessionCookies {
    pub fn new(secret: &str, secure: bool) -> Result<Self, StartupError> {
        let key = derive_cookie_key(secret).map_err(|e| StartupError::InvalidConfiguration {
            name: "SESSION_SECRET",
            reason: e.to_string(),
        })?;
        Ok(Self { key, secure })
    }

    pub fn session_cookie(
        &self,
        session: &Session,
        ttl: chrono::Duration,
    ) -> Result<Cookie<'static>, ApiError> {
        let cookie = Cookie::build(SESSION_COOKIE, session.id.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::seconds(ttl.num_seconds()))
            .finish();
        sign_cookie(&self.key, cookie)
            .ok_or_else(|| ApiError::Internal("Failed to sign session cookie".to_string()))
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish();
        cookie.make_removal();
        cookie
    }

    /// Returns the session id carried by a correctly signed cookie.
    pub fn session_id(&self, cookie: Cookie<'static>) -> Option<String> {
        let id = verify_cookie(&self.key, cookie);
        if id.is_none() {
            warn!("Session cookie failed signature check");
        }
        id
    }
}

/// Resolves the identity behind a session cookie. Every failure degrades to
/// an anonymous context; this never fails the request.
pub async fn resolve_context(state: &AppState, cookie: Option<Cookie<'static>>) -> RequestContext {
    let Some(session_id) = cookie.and_then(|cookie| state.cookies.session_id(cookie)) else {
        return RequestContext::default();
    };

    let session = match state.sessions.resolve(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            debug!("Session unknown or expired");
            return RequestContext::default();
        }
        Err(e) => {
            warn!(error = %e, "Session lookup failed, continuing anonymously");
            return RequestContext::default();
        }
    };

    let current_user = match state.auth.find_user(&session.user_id).await {
        Ok(Some(user)) => Some(CurrentUser::from(&user)),
        Ok(None) => {
            warn!(user_id = %session.user_id, "Session references a missing user");
            None
        }
        Err(e) => {
            warn!(error = %e, "User lookup failed, continuing anonymously");
            None
        }
    };

    RequestContext {
        request_id: None,
        session_id: Some(session.id),
        current_user,
    }
}
