//! Authentication service implementations

pub mod account;
pub mod password;
pub mod token;
