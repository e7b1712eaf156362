// API Server for the EduNet franchise platform
// REST layer over the org-scope authorization engine

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use server::Server;
pub use state::AppState;

/// API version
pub const API_VERSION: &str = "v1";

/// Health check response
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
