//! Regions, region links and weather samples

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_persistence::{AllowedRegion, Region, RegionApiary, RegionPersistence, WeatherData};

use crate::error::AppError;
use crate::model::AppState;

// ==================== Region ====================

#[get("")]
async fn list_regions(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let regions = data
        .persistence()
        .region_list()
        .await
        .context("Failed to list regions")?;
    Ok(HttpResponse::Ok().json(regions))
}

#[get("/{id}")]
async fn get_region(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let region = data
        .persistence()
        .region_get(id.into_inner())
        .await
        .context("Failed to get region")?;
    Ok(HttpResponse::Ok().json(region))
}

#[post("")]
async fn create_region(
    data: web::Data<AppState>,
    body: web::Json<Region>,
) -> Result<HttpResponse, AppError> {
    let region = data
        .persistence()
        .region_create(body.into_inner())
        .await
        .context("Failed to create region")?;
    Ok(HttpResponse::Ok().json(region))
}

#[put("")]
async fn update_region(
    data: web::Data<AppState>,
    body: web::Json<Region>,
) -> Result<HttpResponse, AppError> {
    let region = data
        .persistence()
        .region_update(body.into_inner())
        .await
        .context("Failed to update region")?;
    Ok(HttpResponse::Ok().json(region))
}

#[delete("/{id}")]
async fn delete_region(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .region_delete(id.into_inner())
        .await
        .context("Failed to delete region")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn region_routes() -> Scope {
    web::scope("/region")
        .service(list_regions)
        .service(get_region)
        .service(create_region)
        .service(update_region)
        .service(delete_region)
}

// ==================== Region Apiary ====================

#[get("")]
async fn list_region_apiaries(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let links = data
        .persistence()
        .region_apiary_list()
        .await
        .context("Failed to list region apiaries")?;
    Ok(HttpResponse::Ok().json(links))
}

#[get("/{id}")]
async fn get_region_apiary(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .region_apiary_get(id.into_inner())
        .await
        .context("Failed to get region apiary")?;
    Ok(HttpResponse::Ok().json(link))
}

#[post("")]
async fn create_region_apiary(
    data: web::Data<AppState>,
    body: web::Json<RegionApiary>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .region_apiary_create(body.into_inner())
        .await
        .context("Failed to create region apiary")?;
    Ok(HttpResponse::Ok().json(link))
}

#[put("")]
async fn update_region_apiary(
    data: web::Data<AppState>,
    body: web::Json<RegionApiary>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .region_apiary_update(body.into_inner())
        .await
        .context("Failed to update region apiary")?;
    Ok(HttpResponse::Ok().json(link))
}

#[delete("/{id}")]
async fn delete_region_apiary(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .region_apiary_delete(id.into_inner())
        .await
        .context("Failed to delete region apiary")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn region_apiary_routes() -> Scope {
    web::scope("/region-apiary")
        .service(list_region_apiaries)
        .service(get_region_apiary)
        .service(create_region_apiary)
        .service(update_region_apiary)
        .service(delete_region_apiary)
}

// ==================== Allowed Region ====================

#[get("")]
async fn list_allowed_regions(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let links = data
        .persistence()
        .allowed_region_list()
        .await
        .context("Failed to list allowed regions")?;
    Ok(HttpResponse::Ok().json(links))
}

#[get("/user/{user_id}")]
async fn list_allowed_regions_by_user(
    data: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let links = data
        .persistence()
        .allowed_region_list_by_user(user_id.into_inner())
        .await
        .context("Failed to list allowed regions of user")?;
    Ok(HttpResponse::Ok().json(links))
}

#[get("/{id}")]
async fn get_allowed_region(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .allowed_region_get(id.into_inner())
        .await
        .context("Failed to get allowed region")?;
    Ok(HttpResponse::Ok().json(link))
}

#[post("")]
async fn create_allowed_region(
    data: web::Data<AppState>,
    body: web::Json<AllowedRegion>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .allowed_region_create(body.into_inner())
        .await
        .context("Failed to create allowed region")?;
    Ok(HttpResponse::Ok().json(link))
}

#[put("")]
async fn update_allowed_region(
    data: web::Data<AppState>,
    body: web::Json<AllowedRegion>,
) -> Result<HttpResponse, AppError> {
    let link = data
        .persistence()
        .allowed_region_update(body.into_inner())
        .await
        .context("Failed to update allowed region")?;
    Ok(HttpResponse::Ok().json(link))
}

#[delete("/{id}")]
async fn delete_allowed_region(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .allowed_region_delete(id.into_inner())
        .await
        .context("Failed to delete allowed region")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn allowed_region_routes() -> Scope {
    web::scope("/allowed-region")
        .service(list_allowed_regions)
        .service(list_allowed_regions_by_user)
        .service(get_allowed_region)
        .service(create_allowed_region)
        .service(update_allowed_region)
        .service(delete_allowed_region)
}

// ==================== Weather ====================

#[get("")]
async fn list_weather(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let samples = data
        .persistence()
        .weather_list()
        .await
        .context("Failed to list weather data")?;
    Ok(HttpResponse::Ok().json(samples))
}

#[get("/{id}")]
async fn get_weather(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let sample = data
        .persistence()
        .weather_get(id.into_inner())
        .await
        .context("Failed to get weather data")?;
    Ok(HttpResponse::Ok().json(sample))
}

#[post("")]
async fn create_weather(
    data: web::Data<AppState>,
    body: web::Json<WeatherData>,
) -> Result<HttpResponse, AppError> {
    let sample = data
        .persistence()
        .weather_create(body.into_inner())
        .await
        .context("Failed to create weather data")?;
    Ok(HttpResponse::Ok().json(sample))
}

#[put("")]
async fn update_weather(
    data: web::Data<AppState>,
    body: web::Json<WeatherData>,
) -> Result<HttpResponse, AppError> {
    let sample = data
        .persistence()
        .weather_update(body.into_inner())
        .await
        .context("Failed to update weather data")?;
    Ok(HttpResponse::Ok().json(sample))
}

#[delete("/{id}")]
async fn delete_weather(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .weather_delete(id.into_inner())
        .await
        .context("Failed to delete weather data")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn weather_routes() -> Scope {
    web::scope("/weather-data")
        .service(list_weather)
        .service(get_weather)
        .service(create_weather)
        .service(update_weather)
        .service(delete_weather)
}
