use actix_web::{App, HttpServer, web};
use expense_tracker::infrastructure::config::AppConfig;
use expense_tracker::infrastructure::logging::init_logging;
use expense_tracker::infrastructure::storage::Storage;
use expense_tracker::presentation::handlers::AppState;
use expense_tracker::presentation::middleware::{
    RequestIdMiddleware, SessionMiddleware, TimingMiddleware,
};
use expense_tracker::presentation::routes::configure_routes;
use std::time::Duration;
use tracing::{debug, error, info};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };
    info!(?config, "Configuration loaded");

    let storage = match Storage::connect(&config.database_url) {
        Ok(storage) => storage,
        Err(e) => {
            error!(error = %e, "Could not connect to storage");
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(&config, storage) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!(error = %e, "Could not initialize application state");
            std::process::exit(1);
        }
    };
    info!("Application state initialized");

    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purge_state.sessions.purge_expired().await {
                Ok(purged) => debug!(purged, "Expired sessions purged"),
                Err(e) => error!(error = %e, "Session purge failed"),
            }
        }
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware)
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(configure_routes)
    });

    let (host, port) = config.bind_address();
    let server = server.bind((host.as_str(), port))?;
    info!(address = %format!("{}:{}", host, port), "Server running");
    server.run().await
}
