//! Unauthenticated operational endpoints

use actix_web::{HttpResponse, get, http::StatusCode, web};

use crate::api::model::StatusResponse;
use crate::error::error_response;
use crate::model::AppState;

fn ok_status() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        status: "ok".to_string(),
    })
}

#[get("/livez")]
async fn livez() -> HttpResponse {
    ok_status()
}

#[get("/readyz")]
async fn readyz() -> HttpResponse {
    ok_status()
}

#[get("/metrics")]
async fn metrics(data: web::Data<AppState>) -> HttpResponse {
    match &data.prometheus {
        Some(handle) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(handle.render()),
        None => error_response(StatusCode::SERVICE_UNAVAILABLE, "Metrics recorder not installed"),
    }
}
