//! HTTP layer
//!
//! Axum server with:
//! - Server-rendered pages and flash messages
//! - Request tracing and timeout
//! - Graceful shutdown

pub mod routes;
pub mod server;
pub mod views;

pub use server::{build_router, run_server, AppState, ServerConfig};
