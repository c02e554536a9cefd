use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_persistence::{ProductionReport, ReportPersistence};

use crate::api::model::RecentQuery;
use crate::error::AppError;
use crate::model::AppState;

const DEFAULT_RECENT_LIMIT: u64 = 50;
const MAX_RECENT_LIMIT: u64 = 500;

#[get("")]
async fn list_reports(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let reports = data
        .persistence()
        .production_report_list()
        .await
        .context("Failed to list production reports")?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Newest reports by end date, `?limit=N` (default 50)
#[get("/recent")]
async fn list_recent_reports(
    data: web::Data<AppState>,
    query: web::Query<RecentQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let reports = data
        .persistence()
        .production_report_recent(limit)
        .await
        .context("Failed to list recent production reports")?;
    Ok(HttpResponse::Ok().json(reports))
}

#[get("/curated/{user_id}")]
async fn list_curated_reports(
    data: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let reports = data
        .persistence()
        .production_report_list_by_curator(user_id.into_inner())
        .await
        .context("Failed to list production reports of curator")?;
    Ok(HttpResponse::Ok().json(reports))
}

#[get("/{id}")]
async fn get_report(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let report = data
        .persistence()
        .production_report_get(id.into_inner())
        .await
        .context("Failed to get production report")?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("")]
async fn create_report(
    data: web::Data<AppState>,
    body: web::Json<ProductionReport>,
) -> Result<HttpResponse, AppError> {
    let report = data
        .persistence()
        .production_report_create(body.into_inner())
        .await
        .context("Failed to create production report")?;
    Ok(HttpResponse::Ok().json(report))
}

#[put("")]
async fn update_report(
    data: web::Data<AppState>,
    body: web::Json<ProductionReport>,
) -> Result<HttpResponse, AppError> {
    let report = data
        .persistence()
        .production_report_update(body.into_inner())
        .await
        .context("Failed to update production report")?;
    Ok(HttpResponse::Ok().json(report))
}

#[delete("/{id}")]
async fn delete_report(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .production_report_delete(id.into_inner())
        .await
        .context("Failed to delete production report")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes() -> Scope {
    web::scope("/production-report")
        .service(list_reports)
        .service(list_recent_reports)
        .service(list_curated_reports)
        .service(get_report)
        .service(create_report)
        .service(update_report)
        .service(delete_report)
}
