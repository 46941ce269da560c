pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod session;
