//! Sensors and sensor readings
//!
//! Sensor creation and removal are mirrored to the ingestion side over the
//! bus. The store write is the source of truth: publish failures are logged
//! and the request still succeeds.

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_bus::queue::{HIVE_QUEUE, SENSOR_DELETE_QUEUE};
use apiary_bus::{DeleteSensorMessage, HiveSensorMessage, publish_json};
use apiary_persistence::{IotPersistence, Sensor, SensorReading};

use crate::error::AppError;
use crate::model::AppState;

// ==================== Sensor ====================

#[get("")]
async fn list_sensors(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let sensors = data
        .persistence()
        .sensor_list()
        .await
        .context("Failed to list sensors")?;
    Ok(HttpResponse::Ok().json(sensors))
}

#[get("/hive/{hive_id}")]
async fn list_sensors_by_hive(
    data: web::Data<AppState>,
    hive_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let sensors = data
        .persistence()
        .sensor_list_by_hive(hive_id.into_inner())
        .await
        .context("Failed to list sensors of hive")?;
    Ok(HttpResponse::Ok().json(sensors))
}

#[get("/{id}")]
async fn get_sensor(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let sensor = data
        .persistence()
        .sensor_get(id.into_inner())
        .await
        .context("Failed to get sensor")?;
    Ok(HttpResponse::Ok().json(sensor))
}

#[post("")]
async fn create_sensor(
    data: web::Data<AppState>,
    body: web::Json<Sensor>,
) -> Result<HttpResponse, AppError> {
    let sensor = data
        .persistence()
        .sensor_create(body.into_inner())
        .await
        .context("Failed to create sensor")?;

    let message = HiveSensorMessage {
        hive_id: sensor.hive_id,
        sensors: vec![sensor.clone()],
    };
    if let Err(e) = publish_json(data.publisher(), HIVE_QUEUE, &message).await {
        tracing::warn!(
            hive_id = sensor.hive_id,
            sensor_id = sensor.sensor_id,
            "Failed to publish new sensor: {}",
            e
        );
    }

    Ok(HttpResponse::Ok().json(sensor))
}

#[put("")]
async fn update_sensor(
    data: web::Data<AppState>,
    body: web::Json<Sensor>,
) -> Result<HttpResponse, AppError> {
    let sensor = data
        .persistence()
        .sensor_update(body.into_inner())
        .await
        .context("Failed to update sensor")?;
    Ok(HttpResponse::Ok().json(sensor))
}

#[delete("/{id}")]
async fn delete_sensor(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let sensor_id = id.into_inner();
    let sensor = data
        .persistence()
        .sensor_get(sensor_id)
        .await
        .context("Failed to get sensor")?;

    data.persistence()
        .sensor_delete(sensor_id)
        .await
        .context("Failed to delete sensor")?;

    let message = DeleteSensorMessage {
        hive_id: sensor.hive_id,
        sensor_id,
    };
    if let Err(e) = publish_json(data.publisher(), SENSOR_DELETE_QUEUE, &message).await {
        tracing::warn!(
            hive_id = sensor.hive_id,
            sensor_id,
            "Failed to publish sensor delete: {}",
            e
        );
    }

    Ok(HttpResponse::NoContent().finish())
}

pub fn sensor_routes() -> Scope {
    web::scope("/sensor")
        .service(list_sensors)
        .service(list_sensors_by_hive)
        .service(get_sensor)
        .service(create_sensor)
        .service(update_sensor)
        .service(delete_sensor)
}

// ==================== Sensor Reading ====================

#[get("")]
async fn list_readings(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let readings = data
        .persistence()
        .sensor_reading_list()
        .await
        .context("Failed to list sensor readings")?;
    Ok(HttpResponse::Ok().json(readings))
}

#[get("/{id}")]
async fn get_reading(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let reading = data
        .persistence()
        .sensor_reading_get(id.into_inner())
        .await
        .context("Failed to get sensor reading")?;
    Ok(HttpResponse::Ok().json(reading))
}

#[post("")]
async fn create_reading(
    data: web::Data<AppState>,
    body: web::Json<SensorReading>,
) -> Result<HttpResponse, AppError> {
    let reading = data
        .persistence()
        .sensor_reading_create(body.into_inner())
        .await
        .context("Failed to create sensor reading")?;
    Ok(HttpResponse::Ok().json(reading))
}

#[put("")]
async fn update_reading(
    data: web::Data<AppState>,
    body: web::Json<SensorReading>,
) -> Result<HttpResponse, AppError> {
    let reading = data
        .persistence()
        .sensor_reading_update(body.into_inner())
        .await
        .context("Failed to update sensor reading")?;
    Ok(HttpResponse::Ok().json(reading))
}

#[delete("/{id}")]
async fn delete_reading(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .sensor_reading_delete(id.into_inner())
        .await
        .context("Failed to delete sensor reading")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn sensor_reading_routes() -> Scope {
    web::scope("/sensor-reading")
        .service(list_readings)
        .service(get_reading)
        .service(create_reading)
        .service(update_reading)
        .service(delete_reading)
}
