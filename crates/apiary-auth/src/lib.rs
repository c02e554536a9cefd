//! Apiary Auth - authentication and authorization
//!
//! This crate provides:
//! - JWT issuance and verification (HS256)
//! - bcrypt password hashing
//! - Login and registration flows over the user store
//! - The request-scoped auth context consumed by the role gate

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
