//! Apiaries, hives, bee communities and honey harvests

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_bus::queue::SENSOR_DELETE_QUEUE;
use apiary_bus::{DeleteSensorMessage, publish_json};
use apiary_persistence::{Apiary, ApiaryPersistence, BeeCommunity, Hive, HoneyHarvest, IotPersistence};

use crate::error::AppError;
use crate::model::AppState;

// ==================== Apiary ====================

#[get("")]
async fn list_apiaries(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let apiaries = data
        .persistence()
        .apiary_list()
        .await
        .context("Failed to list apiaries")?;
    Ok(HttpResponse::Ok().json(apiaries))
}

#[get("/{id}")]
async fn get_apiary(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let apiary = data
        .persistence()
        .apiary_get(id.into_inner())
        .await
        .context("Failed to get apiary")?;
    Ok(HttpResponse::Ok().json(apiary))
}

#[post("")]
async fn create_apiary(
    data: web::Data<AppState>,
    body: web::Json<Apiary>,
) -> Result<HttpResponse, AppError> {
    let apiary = data
        .persistence()
        .apiary_create(body.into_inner())
        .await
        .context("Failed to create apiary")?;
    Ok(HttpResponse::Ok().json(apiary))
}

#[put("")]
async fn update_apiary(
    data: web::Data<AppState>,
    body: web::Json<Apiary>,
) -> Result<HttpResponse, AppError> {
    let apiary = data
        .persistence()
        .apiary_update(body.into_inner())
        .await
        .context("Failed to update apiary")?;
    Ok(HttpResponse::Ok().json(apiary))
}

#[delete("/{id}")]
async fn delete_apiary(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .apiary_delete(id.into_inner())
        .await
        .context("Failed to delete apiary")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn apiary_routes() -> Scope {
    web::scope("/apiary")
        .service(list_apiaries)
        .service(get_apiary)
        .service(create_apiary)
        .service(update_apiary)
        .service(delete_apiary)
}

// ==================== Hive ====================

#[get("")]
async fn list_hives(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let hives = data
        .persistence()
        .hive_list()
        .await
        .context("Failed to list hives")?;
    Ok(HttpResponse::Ok().json(hives))
}

#[get("/apiary/{apiary_id}")]
async fn list_hives_by_apiary(
    data: web::Data<AppState>,
    apiary_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let hives = data
        .persistence()
        .hive_list_by_apiary(apiary_id.into_inner())
        .await
        .context("Failed to list hives of apiary")?;
    Ok(HttpResponse::Ok().json(hives))
}

#[get("/{id}")]
async fn get_hive(data: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let hive = data
        .persistence()
        .hive_get(id.into_inner())
        .await
        .context("Failed to get hive")?;
    Ok(HttpResponse::Ok().json(hive))
}

#[post("")]
async fn create_hive(
    data: web::Data<AppState>,
    body: web::Json<Hive>,
) -> Result<HttpResponse, AppError> {
    let hive = data
        .persistence()
        .hive_create(body.into_inner())
        .await
        .context("Failed to create hive")?;
    Ok(HttpResponse::Ok().json(hive))
}

#[put("")]
async fn update_hive(
    data: web::Data<AppState>,
    body: web::Json<Hive>,
) -> Result<HttpResponse, AppError> {
    let hive = data
        .persistence()
        .hive_update(body.into_inner())
        .await
        .context("Failed to update hive")?;
    Ok(HttpResponse::Ok().json(hive))
}

/// Announce the removal of every sensor on the hive, then drop the hive row.
#[delete("/{id}")]
async fn delete_hive(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let hive_id = id.into_inner();
    let sensors = data
        .persistence()
        .sensor_list_by_hive(hive_id)
        .await
        .context("Failed to list sensors of hive")?;

    for sensor in &sensors {
        let message = DeleteSensorMessage {
            hive_id,
            sensor_id: sensor.sensor_id,
        };
        if let Err(e) = publish_json(data.publisher(), SENSOR_DELETE_QUEUE, &message).await {
            tracing::warn!(
                hive_id,
                sensor_id = sensor.sensor_id,
                "Failed to publish sensor delete: {}",
                e
            );
        }
    }

    data.persistence()
        .hive_delete(hive_id)
        .await
        .context("Failed to delete hive")?;

    tracing::info!(hive_id, sensors = sensors.len(), "Hive deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn hive_routes() -> Scope {
    web::scope("/hive")
        .service(list_hives)
        .service(list_hives_by_apiary)
        .service(get_hive)
        .service(create_hive)
        .service(update_hive)
        .service(delete_hive)
}

// ==================== Bee Community ====================

#[get("")]
async fn list_communities(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let communities = data
        .persistence()
        .bee_community_list()
        .await
        .context("Failed to list bee communities")?;
    Ok(HttpResponse::Ok().json(communities))
}

#[get("/hive/{hive_id}")]
async fn list_communities_by_hive(
    data: web::Data<AppState>,
    hive_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let communities = data
        .persistence()
        .bee_community_list_by_hive(hive_id.into_inner())
        .await
        .context("Failed to list bee communities of hive")?;
    Ok(HttpResponse::Ok().json(communities))
}

#[get("/{id}")]
async fn get_community(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let community = data
        .persistence()
        .bee_community_get(id.into_inner())
        .await
        .context("Failed to get bee community")?;
    Ok(HttpResponse::Ok().json(community))
}

#[post("")]
async fn create_community(
    data: web::Data<AppState>,
    body: web::Json<BeeCommunity>,
) -> Result<HttpResponse, AppError> {
    let community = data
        .persistence()
        .bee_community_create(body.into_inner())
        .await
        .context("Failed to create bee community")?;
    Ok(HttpResponse::Ok().json(community))
}

#[put("")]
async fn update_community(
    data: web::Data<AppState>,
    body: web::Json<BeeCommunity>,
) -> Result<HttpResponse, AppError> {
    let community = data
        .persistence()
        .bee_community_update(body.into_inner())
        .await
        .context("Failed to update bee community")?;
    Ok(HttpResponse::Ok().json(community))
}

#[delete("/{id}")]
async fn delete_community(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .bee_community_delete(id.into_inner())
        .await
        .context("Failed to delete bee community")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn bee_community_routes() -> Scope {
    web::scope("/bee-community")
        .service(list_communities)
        .service(list_communities_by_hive)
        .service(get_community)
        .service(create_community)
        .service(update_community)
        .service(delete_community)
}

// ==================== Honey Harvest ====================

#[get("")]
async fn list_harvests(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let harvests = data
        .persistence()
        .honey_harvest_list()
        .await
        .context("Failed to list honey harvests")?;
    Ok(HttpResponse::Ok().json(harvests))
}

#[get("/{id}")]
async fn get_harvest(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let harvest = data
        .persistence()
        .honey_harvest_get(id.into_inner())
        .await
        .context("Failed to get honey harvest")?;
    Ok(HttpResponse::Ok().json(harvest))
}

#[post("")]
async fn create_harvest(
    data: web::Data<AppState>,
    body: web::Json<HoneyHarvest>,
) -> Result<HttpResponse, AppError> {
    let harvest = data
        .persistence()
        .honey_harvest_create(body.into_inner())
        .await
        .context("Failed to create honey harvest")?;
    Ok(HttpResponse::Ok().json(harvest))
}

#[put("")]
async fn update_harvest(
    data: web::Data<AppState>,
    body: web::Json<HoneyHarvest>,
) -> Result<HttpResponse, AppError> {
    let harvest = data
        .persistence()
        .honey_harvest_update(body.into_inner())
        .await
        .context("Failed to update honey harvest")?;
    Ok(HttpResponse::Ok().json(harvest))
}

#[delete("/{id}")]
async fn delete_harvest(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .honey_harvest_delete(id.into_inner())
        .await
        .context("Failed to delete honey harvest")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn honey_harvest_routes() -> Scope {
    web::scope("/honey-harvest")
        .service(list_harvests)
        .service(get_harvest)
        .service(create_harvest)
        .service(update_harvest)
        .service(delete_harvest)
}
