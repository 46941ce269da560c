use crate::data::memory::InMemoryExpenseRepository;
use crate::data::session_store::InMemorySessionStore;
use crate::data::user_repository::InMemoryUserRepository;
use crate::infrastructure::config::StartupError;
use tracing::info;

const MEMORY_SCHEME: &str = "memory";

/// The stores backing one running application.
#[derive(Clone, Default)]
pub struct Storage {
    pub expenses: InMemoryExpenseRepository,
    pub users: InMemoryUserRepository,
    pub sessions: InMemorySessionStore,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the backend named by the connection string's scheme. Only
    /// `memory://` is built in.
    pub fn connect(database_url: &str) -> Result<Self, StartupError> {
        let scheme = database_url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| {
                StartupError::ConnectionFailure(
                    "connection string must look like <scheme>://...".to_string(),
                )
            })?;

        if !scheme.eq_ignore_ascii_case(MEMORY_SCHEME) {
            return Err(StartupError::ConnectionFailure(format!(
                "unsupported storage backend '{scheme}'"
            )));
        }

        info!(backend = MEMORY_SCHEME, "Storage connected");
        Ok(Self::in_memory())
    }
}
