// Error handling for the HTTP surface
// Maps the error kind carried in an anyhow chain to a status code and a
// `{"error": "<message>"}` body

use std::fmt::{Display, Formatter};

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use apiary_common::{ApiaryError, find_apiary_error};
use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody::new(message))
}

// Local wrapper so actix-web's ResponseError can be implemented for anyhow errors
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<ApiaryError> for AppError {
    fn from(value: ApiaryError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn kind(&self) -> Option<&ApiaryError> {
        find_apiary_error(&self.inner)
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            Some(ApiaryError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Some(ApiaryError::Unauthenticated(_)) => StatusCode::UNAUTHORIZED,
            Some(ApiaryError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Some(ApiaryError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(ApiaryError::Conflict(_)) => StatusCode::CONFLICT,
            Some(ApiaryError::Internal(_)) | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.inner);
        }
        error_response(status, self.to_string())
    }
}

fn bad_request(message: String) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, format!("Invalid input: {}", message))
}

/// Malformed or mistyped JSON bodies answer 400 instead of actix's plain-text default
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::body::to_bytes;
    use anyhow::Context;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_not_found_maps_to_404_with_chain() {
        let result: anyhow::Result<()> = Err(ApiaryError::not_found("hive", 7).into());
        let err = AppError::from(result.context("Failed to get hive").unwrap_err());

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Failed to get hive: hive 7 not found");
    }

    #[actix_web::test]
    async fn test_kind_to_status() {
        let cases = [
            (ApiaryError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ApiaryError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (ApiaryError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiaryError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiaryError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, expected) in cases {
            assert_eq!(AppError::from(kind).status_code(), expected);
        }
    }

    #[actix_web::test]
    async fn test_untyped_error_is_internal() {
        let err = AppError::from(anyhow::anyhow!("connection reset"));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "connection reset");
    }
}
