// Authentication and role gate middleware for Actix-web
// `Authentication` validates the bearer JWT and attaches an `AuthContext`;
// `RequireRole` checks that context against a fixed role set

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web::Data,
};
use apiary_auth::service::token::decode_jwt_token;
use apiary_auth::{
    ACCESS_DENIED_MESSAGE, AUTHORIZATION_HEADER, AuthContext, INVALID_TOKEN_MESSAGE,
    MISSING_AUTHORIZATION_MESSAGE, MISSING_ROLE_MESSAGE, TOKEN_PREFIX,
};
use apiary_common::Role;
use futures::future::LocalBoxFuture;

use crate::error::error_response;
use crate::model::AppState;

/// Why a request was refused before reaching a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    InvalidToken,
    MissingRole,
    Forbidden,
}

impl Rejection {
    pub fn status(self) -> StatusCode {
        match self {
            Rejection::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rejection::MissingHeader => MISSING_AUTHORIZATION_MESSAGE,
            Rejection::InvalidToken => INVALID_TOKEN_MESSAGE,
            Rejection::MissingRole => MISSING_ROLE_MESSAGE,
            Rejection::Forbidden => ACCESS_DENIED_MESSAGE,
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn extract_token(req: &ServiceRequest) -> Result<String, Rejection> {
    let header = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .ok_or(Rejection::MissingHeader)?;
    let value = header.to_str().map_err(|_| Rejection::InvalidToken)?.trim();
    if value.is_empty() {
        return Err(Rejection::MissingHeader);
    }

    match value.strip_prefix(TOKEN_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(Rejection::InvalidToken),
    }
}

/// Verify the token and turn its claims into an auth context
pub fn authenticate(token: &str, secret_key: &str) -> Result<AuthContext, Rejection> {
    let data = decode_jwt_token(token, secret_key).map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        Rejection::InvalidToken
    })?;

    if data.claims.role.trim().is_empty() {
        return Err(Rejection::MissingRole);
    }
    let role = data
        .claims
        .role
        .parse::<Role>()
        .map_err(|_| Rejection::Forbidden)?;

    Ok(AuthContext {
        user_id: data.claims.user_id,
        role,
    })
}

fn reject<B>(req: ServiceRequest, rejection: Rejection) -> ServiceResponse<EitherBody<B>> {
    tracing::debug!(path = req.path(), ?rejection, "Request rejected");
    let response = error_response(rejection.status(), rejection.message());
    req.into_response(response).map_into_right_body()
}

// Authentication middleware transformer
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(secret_key) = req
            .app_data::<Data<AppState>>()
            .map(|state| state.token_secret_key())
        else {
            tracing::error!("AppState not found in request app_data");
            return Box::pin(async move { Ok(reject(req, Rejection::InvalidToken)) });
        };

        let context = extract_token(&req).and_then(|token| authenticate(&token, &secret_key));
        match context {
            Ok(context) => {
                req.extensions_mut().insert(context);
                let res = self.service.call(req);
                Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => Box::pin(async move { Ok(reject(req, rejection)) }),
        }
    }
}

/// Role gate. Must be wrapped inside `Authentication`.
pub struct RequireRole {
    roles: &'static [Role],
}

impl RequireRole {
    pub fn new(roles: &'static [Role]) -> Self {
        Self { roles }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireRoleMiddleware {
            service,
            roles: self.roles,
        })
    }
}

pub struct RequireRoleMiddleware<S> {
    service: S,
    roles: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let allowed = req
            .extensions()
            .get::<AuthContext>()
            .is_some_and(|context| context.has_any_role(self.roles));

        if !allowed {
            return Box::pin(async move { Ok(reject(req, Rejection::Forbidden)) });
        }

        let res = self.service.call(req);
        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
