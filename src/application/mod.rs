pub mod auth_service;
pub mod service;
pub mod session_service;
