use crate::infrastructure::config::Environment;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,expense_tracker=debug";
const PRODUCTION_FILTER: &str = "info";

fn default_filter(environment: Environment) -> &'static str {
    if environment.is_production() {
        PRODUCTION_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the per-environment
/// default. Production output is plain text without ANSI colours.
pub fn init_logging() {
    let environment = std::env::var("APP_ENV")
        .map(|raw| Environment::parse(&raw))
        .unwrap_or(Environment::Development);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let production = environment.is_production();
    let plain = production.then(|| tracing_subscriber::fmt::layer().with_ansi(false));
    let compact = (!production).then(|| tracing_subscriber::fmt::layer().compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(compact)
        .init();
}
