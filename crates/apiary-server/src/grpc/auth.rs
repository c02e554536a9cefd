//! Bearer-token check for gRPC calls
//!
//! Reads the `authorization` metadata entry and verifies it the same way the
//! HTTP middleware does. When disabled, every call passes through untouched.

use std::sync::Arc;

use apiary_auth::TOKEN_PREFIX;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::middleware::auth::{Rejection, authenticate};

const AUTHORIZATION_METADATA: &str = "authorization";

#[derive(Clone, Default)]
pub struct GrpcAuth {
    secret_key: Option<Arc<str>>,
}

impl GrpcAuth {
    pub fn enabled(secret_key: &str) -> Self {
        Self {
            secret_key: Some(Arc::from(secret_key)),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.secret_key.is_some()
    }
}

fn bearer_token<T>(request: &Request<T>) -> Result<&str, Rejection> {
    let value = request
        .metadata()
        .get(AUTHORIZATION_METADATA)
        .ok_or(Rejection::MissingHeader)?
        .to_str()
        .map_err(|_| Rejection::InvalidToken)?
        .trim();

    match value.strip_prefix(TOKEN_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Rejection::InvalidToken),
    }
}

fn to_status(rejection: Rejection) -> Status {
    match rejection {
        Rejection::Forbidden => Status::permission_denied(rejection.message()),
        _ => Status::unauthenticated(rejection.message()),
    }
}

impl Interceptor for GrpcAuth {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            return Ok(request);
        };

        let context = bearer_token(&request)
            .and_then(|token| authenticate(token, secret_key))
            .map_err(to_status)?;
        request.extensions_mut().insert(context);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use apiary_auth::service::token::encode_jwt_token;
    use apiary_auth::{AuthContext, MISSING_AUTHORIZATION_MESSAGE};
    use apiary_common::Role;
    use tonic::Code;

    use super::*;

    const SECRET: &str = "grpc-test-secret";

    fn request_with(value: &str) -> Request<()> {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(AUTHORIZATION_METADATA, value.parse().unwrap());
        request
    }

    #[test]
    fn test_disabled_passes_everything() {
        let mut auth = GrpcAuth::disabled();
        assert!(!auth.is_enabled());
        assert!(auth.call(Request::new(())).is_ok());
    }

    #[test]
    fn test_missing_metadata_is_unauthenticated() {
        let status = GrpcAuth::enabled(SECRET)
            .call(Request::new(()))
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), MISSING_AUTHORIZATION_MESSAGE);
    }

    #[test]
    fn test_valid_token_sets_context() {
        let token = encode_jwt_token(7, "manager", SECRET, 3600).unwrap();
        let request = GrpcAuth::enabled(SECRET)
            .call(request_with(&format!("Bearer {}", token)))
            .unwrap();

        let context = request.extensions().get::<AuthContext>().unwrap();
        assert_eq!(context.user_id, 7);
        assert_eq!(context.role, Role::Manager);
    }

    #[test]
    fn test_wrong_secret_and_unknown_role() {
        let token = encode_jwt_token(7, "manager", "other-secret", 3600).unwrap();
        let status = GrpcAuth::enabled(SECRET)
            .call(request_with(&format!("Bearer {}", token)))
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);

        let token = encode_jwt_token(7, "beekeeper", SECRET, 3600).unwrap();
        let status = GrpcAuth::enabled(SECRET)
            .call(request_with(&format!("Bearer {}", token)))
            .unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);
    }
}
