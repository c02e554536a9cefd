//! Authentication models
//!
//! Token claims, request bodies for the public auth routes, and the immutable
//! per-request context the JWT middleware attaches for the role gate.

use apiary_common::Role;
use serde::{Deserialize, Serialize};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 24 * 60 * 60;

pub const MISSING_AUTHORIZATION_MESSAGE: &str = "Missing authorization header";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";
pub const MISSING_ROLE_MESSAGE: &str = "Invalid token claims: missing role";
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied: insufficient permissions";
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid login or password";

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    #[serde(default)]
    pub role: String,
    pub exp: i64,
}

/// Auth context passed through request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i32,
    pub role: Role,
}

impl AuthContext {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gate_membership() {
        let ctx = AuthContext {
            user_id: 1,
            role: Role::Worker,
        };
        assert!(ctx.has_any_role(&Role::ALL));
        assert!(!ctx.has_any_role(&Role::STAFF));
    }

    #[test]
    fn test_claims_without_role_deserialize_empty() {
        let claims: Claims = serde_json::from_str(r#"{"user_id":3,"exp":10}"#).unwrap();
        assert_eq!(claims.role, "");
    }
}
