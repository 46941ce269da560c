use crate::presentation::auth::{
    login, login_page, logout, logout_page, register, register_page, session_info,
};
use crate::presentation::handlers::{
    ApiError, create_expense, delete_expense, expense_summary, get_expense, health_check,
    list_expenses, update_expense,
};
use crate::presentation::middleware::RequireAuth;
use crate::presentation::pages::{dashboard, history, index};
use actix_web::web;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/expenses/dashboard";

/// Mounts every route. The caller wraps the app in the request-id, timing
/// and session middleware.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .service(web::resource("/").route(web::get().to(index)))
    .service(web::resource("/health").route(web::get().to(health_check)))
    .service(
        web::resource(LOGIN_PATH)
            .route(web::get().to(login_page))
            .route(web::post().to(login)),
    )
    .service(
        web::resource("/logout")
            .route(web::get().to(logout_page))
            .route(web::post().to(logout)),
    )
    .service(
        web::resource(REGISTER_PATH)
            .route(web::get().to(register_page))
            .route(web::post().to(register)),
    )
    .service(web::resource("/session").route(web::get().to(session_info)))
    .service(
        web::scope("/expenses")
            .wrap(RequireAuth::redirect_to(LOGIN_PATH))
            .service(web::resource("/dashboard").route(web::get().to(dashboard)))
            .service(web::resource("/history").route(web::get().to(history))),
    )
    .service(
        web::scope("/api/expenses")
            .wrap(RequireAuth::reject())
            .service(
                web::resource("")
                    .route(web::get().to(list_expenses))
                    .route(web::post().to(create_expense)),
            )
            .service(web::resource("/summary").route(web::get().to(expense_summary)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_expense))
                    .route(web::put().to(update_expense))
                    .route(web::patch().to(update_expense))
                    .route(web::delete().to(delete_expense)),
            ),
    );
}
