//! Rugscope REST API Module
//! HTTP surface over the risk engine: health, stats, analyze, batch

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::{validate_address, AppState};
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
