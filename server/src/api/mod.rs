//! API server and routes

pub mod auth;
pub mod routes;
mod server;
pub mod types;

pub use auth::{AuthManager, AuthUser};
pub use server::{ApiServer, AppState};
pub use types::ApiError;
