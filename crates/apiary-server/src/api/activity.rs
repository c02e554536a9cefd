//! Field activity: observation logs, maintenance plans and incidents

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_bus::publish_json;
use apiary_bus::queue::INCIDENT_QUEUE;
use apiary_common::ApiaryError;
use apiary_persistence::{ActivityPersistence, Incident, MaintenancePlan, ObservationLog};

use crate::api::model::{IncidentStatusRequest, MaintenanceStatusRequest};
use crate::error::AppError;
use crate::model::AppState;

fn require_label(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(ApiaryError::InvalidInput(format!("{} is required", field)).into());
    }
    Ok(())
}

// ==================== Observation ====================

#[get("")]
async fn list_observations(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let logs = data
        .persistence()
        .observation_list()
        .await
        .context("Failed to list observations")?;
    Ok(HttpResponse::Ok().json(logs))
}

#[get("/{id}")]
async fn get_observation(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let log = data
        .persistence()
        .observation_get(id.into_inner())
        .await
        .context("Failed to get observation")?;
    Ok(HttpResponse::Ok().json(log))
}

#[post("")]
async fn create_observation(
    data: web::Data<AppState>,
    body: web::Json<ObservationLog>,
) -> Result<HttpResponse, AppError> {
    let log = data
        .persistence()
        .observation_create(body.into_inner())
        .await
        .context("Failed to create observation")?;
    Ok(HttpResponse::Ok().json(log))
}

#[put("")]
async fn update_observation(
    data: web::Data<AppState>,
    body: web::Json<ObservationLog>,
) -> Result<HttpResponse, AppError> {
    let log = data
        .persistence()
        .observation_update(body.into_inner())
        .await
        .context("Failed to update observation")?;
    Ok(HttpResponse::Ok().json(log))
}

#[delete("/{id}")]
async fn delete_observation(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .observation_delete(id.into_inner())
        .await
        .context("Failed to delete observation")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn observation_routes() -> Scope {
    web::scope("/observation")
        .service(list_observations)
        .service(get_observation)
        .service(create_observation)
        .service(update_observation)
        .service(delete_observation)
}

// ==================== Maintenance ====================

#[get("")]
async fn list_maintenance(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let plans = data
        .persistence()
        .maintenance_list()
        .await
        .context("Failed to list maintenance plans")?;
    Ok(HttpResponse::Ok().json(plans))
}

#[get("/{id}")]
async fn get_maintenance(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let plan = data
        .persistence()
        .maintenance_get(id.into_inner())
        .await
        .context("Failed to get maintenance plan")?;
    Ok(HttpResponse::Ok().json(plan))
}

#[post("")]
async fn create_maintenance(
    data: web::Data<AppState>,
    body: web::Json<MaintenancePlan>,
) -> Result<HttpResponse, AppError> {
    require_label("status", &body.status)?;
    let plan = data
        .persistence()
        .maintenance_create(body.into_inner())
        .await
        .context("Failed to create maintenance plan")?;
    Ok(HttpResponse::Ok().json(plan))
}

#[put("")]
async fn update_maintenance(
    data: web::Data<AppState>,
    body: web::Json<MaintenancePlan>,
) -> Result<HttpResponse, AppError> {
    require_label("status", &body.status)?;
    let plan = data
        .persistence()
        .maintenance_update(body.into_inner())
        .await
        .context("Failed to update maintenance plan")?;
    Ok(HttpResponse::Ok().json(plan))
}

#[put("/{id}/status")]
async fn update_maintenance_status(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    body: web::Json<MaintenanceStatusRequest>,
) -> Result<HttpResponse, AppError> {
    require_label("status", &body.status)?;
    let plan = data
        .persistence()
        .maintenance_update_status(id.into_inner(), body.status.trim())
        .await
        .context("Failed to update maintenance status")?;
    Ok(HttpResponse::Ok().json(plan))
}

#[delete("/{id}")]
async fn delete_maintenance(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .maintenance_delete(id.into_inner())
        .await
        .context("Failed to delete maintenance plan")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn maintenance_routes() -> Scope {
    web::scope("/maintenance")
        .service(list_maintenance)
        .service(get_maintenance)
        .service(create_maintenance)
        .service(update_maintenance)
        .service(update_maintenance_status)
        .service(delete_maintenance)
}

// ==================== Incident ====================

#[get("")]
async fn list_incidents(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let incidents = data
        .persistence()
        .incident_list()
        .await
        .context("Failed to list incidents")?;
    Ok(HttpResponse::Ok().json(incidents))
}

#[get("/{id}")]
async fn get_incident(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let incident = data
        .persistence()
        .incident_get(id.into_inner())
        .await
        .context("Failed to get incident")?;
    Ok(HttpResponse::Ok().json(incident))
}

/// Store the incident, then notify the incident queue. A failed publish does
/// not fail the request.
#[post("")]
async fn create_incident(
    data: web::Data<AppState>,
    body: web::Json<Incident>,
) -> Result<HttpResponse, AppError> {
    let incident = data
        .persistence()
        .incident_create(body.into_inner())
        .await
        .context("Failed to create incident")?;

    if let Err(e) = publish_json(data.publisher(), INCIDENT_QUEUE, &incident).await {
        tracing::warn!(
            incident_id = incident.incident_id,
            "Failed to publish incident: {}",
            e
        );
    }

    Ok(HttpResponse::Ok().json(incident))
}

#[put("")]
async fn update_incident(
    data: web::Data<AppState>,
    body: web::Json<Incident>,
) -> Result<HttpResponse, AppError> {
    let incident = data
        .persistence()
        .incident_update(body.into_inner())
        .await
        .context("Failed to update incident")?;
    Ok(HttpResponse::Ok().json(incident))
}

#[put("/{id}/status")]
async fn update_incident_status(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    body: web::Json<IncidentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    require_label("severity", &body.severity)?;
    let incident = data
        .persistence()
        .incident_update_severity(id.into_inner(), body.severity.trim())
        .await
        .context("Failed to update incident status")?;
    Ok(HttpResponse::Ok().json(incident))
}

#[delete("/{id}")]
async fn delete_incident(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .incident_delete(id.into_inner())
        .await
        .context("Failed to delete incident")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn incident_routes() -> Scope {
    web::scope("/incident")
        .service(list_incidents)
        .service(get_incident)
        .service(create_incident)
        .service(update_incident)
        .service(update_incident_status)
        .service(delete_incident)
}
