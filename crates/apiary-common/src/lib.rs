//! Apiary Common - shared types for every apiary crate
//!
//! - Error taxonomy (`ApiaryError`) carried inside `anyhow` chains
//! - User role enumeration
//! - Serde helpers for opaque byte payloads

pub mod bytes;
pub mod error;
pub mod role;

pub use error::{ApiaryError, find_apiary_error};
pub use role::Role;
