//! Apiary Server - HTTP API, gRPC facade and process wiring
//!
//! The binary in `main.rs` is a thin supervisor; everything it starts lives
//! here so integration tests can build the same HTTP app and gRPC service.

pub mod api;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod startup;

pub use error::AppError;
pub use model::{AppState, Configuration};
