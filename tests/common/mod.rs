#![allow(unused_macros)]

// Shared setup for the integration tests. Macros keep the concrete service
// types out of helper signatures.

macro_rules! setup_app {
    () => {{
        let cookies = expense_tracker::presentation::session::SessionCookies::new(
            "test-secret-key-for-integration-tests",
            false,
        )
        .unwrap();
        let state = expense_tracker::presentation::handlers::AppState::new(
            expense_tracker::infrastructure::storage::Storage::in_memory(),
            cookies,
            chrono::Duration::hours(24),
            "public",
        );
        let state = actix_web::web::Data::new(state);

        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(state.clone())
                .wrap(expense_tracker::presentation::middleware::SessionMiddleware)
                .wrap(expense_tracker::presentation::middleware::TimingMiddleware)
                .wrap(expense_tracker::presentation::middleware::RequestIdMiddleware)
                .configure(expense_tracker::presentation::routes::configure_routes),
        )
        .await
    }};
}

macro_rules! register {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        resp.response()
            .cookies()
            .find(|c| c.name() == expense_tracker::presentation::session::SESSION_COOKIE)
            .expect("login sets the session cookie")
            .into_owned()
    }};
}

/// Registers a user and logs in. Yields `(user_id, session_cookie)`.
macro_rules! register_and_login {
    ($app:expr, $email:expr) => {{
        let user_id = register!($app, $email, "password123");
        let cookie = login!($app, $email, "password123");
        (user_id, cookie)
    }};
}
