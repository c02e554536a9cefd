//! Veterinary passports and records

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_persistence::{VeterinaryPassport, VeterinaryPersistence, VeterinaryRecord};

use crate::error::AppError;
use crate::model::AppState;

// ==================== Passport ====================

#[get("")]
async fn list_passports(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let passports = data
        .persistence()
        .passport_list()
        .await
        .context("Failed to list veterinary passports")?;
    Ok(HttpResponse::Ok().json(passports))
}

#[get("/{id}")]
async fn get_passport(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let passport = data
        .persistence()
        .passport_get(id.into_inner())
        .await
        .context("Failed to get veterinary passport")?;
    Ok(HttpResponse::Ok().json(passport))
}

#[get("/{id}/records")]
async fn list_passport_records(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let records = data
        .persistence()
        .veterinary_record_list_by_passport(id.into_inner())
        .await
        .context("Failed to list veterinary records of passport")?;
    Ok(HttpResponse::Ok().json(records))
}

#[post("")]
async fn create_passport(
    data: web::Data<AppState>,
    body: web::Json<VeterinaryPassport>,
) -> Result<HttpResponse, AppError> {
    let passport = data
        .persistence()
        .passport_create(body.into_inner())
        .await
        .context("Failed to create veterinary passport")?;
    Ok(HttpResponse::Ok().json(passport))
}

#[put("")]
async fn update_passport(
    data: web::Data<AppState>,
    body: web::Json<VeterinaryPassport>,
) -> Result<HttpResponse, AppError> {
    let passport = data
        .persistence()
        .passport_update(body.into_inner())
        .await
        .context("Failed to update veterinary passport")?;
    Ok(HttpResponse::Ok().json(passport))
}

#[delete("/{id}")]
async fn delete_passport(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .passport_delete(id.into_inner())
        .await
        .context("Failed to delete veterinary passport")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn passport_routes() -> Scope {
    web::scope("/veterinary-passport")
        .service(list_passports)
        .service(get_passport)
        .service(list_passport_records)
        .service(create_passport)
        .service(update_passport)
        .service(delete_passport)
}

// ==================== Record ====================

#[get("")]
async fn list_records(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let records = data
        .persistence()
        .veterinary_record_list()
        .await
        .context("Failed to list veterinary records")?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/{id}")]
async fn get_record(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let record = data
        .persistence()
        .veterinary_record_get(id.into_inner())
        .await
        .context("Failed to get veterinary record")?;
    Ok(HttpResponse::Ok().json(record))
}

#[post("")]
async fn create_record(
    data: web::Data<AppState>,
    body: web::Json<VeterinaryRecord>,
) -> Result<HttpResponse, AppError> {
    let record = data
        .persistence()
        .veterinary_record_create(body.into_inner())
        .await
        .context("Failed to create veterinary record")?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("")]
async fn update_record(
    data: web::Data<AppState>,
    body: web::Json<VeterinaryRecord>,
) -> Result<HttpResponse, AppError> {
    let record = data
        .persistence()
        .veterinary_record_update(body.into_inner())
        .await
        .context("Failed to update veterinary record")?;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/{id}")]
async fn delete_record(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .veterinary_record_delete(id.into_inner())
        .await
        .context("Failed to delete veterinary record")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn record_routes() -> Scope {
    web::scope("/veterinary-record")
        .service(list_records)
        .service(get_record)
        .service(create_record)
        .service(update_record)
        .service(delete_record)
}
