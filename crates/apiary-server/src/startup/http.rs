//! HTTP server setup.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::api;
use crate::middleware::{RateLimiter, RequestTracing};
use crate::model::AppState;

const ACCESS_LOG_FORMAT: &str = r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#;

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "HEAD", "PUT", "DELETE", "PATCH"])
        .allowed_headers(vec![
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .max_age(3600)
}

/// Creates and binds the public HTTP server.
///
/// Signal handling is left to the supervisor; stop the server through its
/// handle.
pub fn http_server(
    app_state: Arc<AppState>,
    rate_limiter: RateLimiter,
    address: String,
    port: u16,
    shutdown_timeout: Duration,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(rate_limiter.clone())
            .wrap(cors())
            .wrap(RequestTracing)
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .app_data(web::Data::from(app_state.clone()))
            .configure(api::configure)
    })
    .disable_signals()
    .shutdown_timeout(shutdown_timeout.as_secs())
    .bind((address, port))?
    .run())
}
