//! Worker groups: a manager's set of worker users

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_common::ApiaryError;
use apiary_persistence::{NewWorkerGroup, UserPersistence};

use crate::api::model::{WorkerGroupMemberRequest, WorkerGroupUpdateRequest};
use crate::error::AppError;
use crate::model::AppState;

fn require_group_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(ApiaryError::InvalidInput("group_name is required".to_string()).into());
    }
    Ok(())
}

#[get("")]
async fn list_groups(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let groups = data
        .persistence()
        .worker_group_list()
        .await
        .context("Failed to list worker groups")?;
    Ok(HttpResponse::Ok().json(groups))
}

#[get("/manager/{manager_id}")]
async fn list_groups_by_manager(
    data: web::Data<AppState>,
    manager_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let groups = data
        .persistence()
        .worker_group_list_by_manager(manager_id.into_inner())
        .await
        .context("Failed to list worker groups of manager")?;
    Ok(HttpResponse::Ok().json(groups))
}

#[get("/worker/{worker_id}/groups")]
async fn list_groups_by_worker(
    data: web::Data<AppState>,
    worker_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let groups = data
        .persistence()
        .worker_group_list_by_worker(worker_id.into_inner())
        .await
        .context("Failed to list worker groups of worker")?;
    Ok(HttpResponse::Ok().json(groups))
}

#[get("/{id}")]
async fn get_group(data: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let group = data
        .persistence()
        .worker_group_get(id.into_inner())
        .await
        .context("Failed to get worker group")?;
    Ok(HttpResponse::Ok().json(group))
}

#[post("")]
async fn create_group(
    data: web::Data<AppState>,
    body: web::Json<NewWorkerGroup>,
) -> Result<HttpResponse, AppError> {
    require_group_name(&body.group_name)?;
    let group = data
        .persistence()
        .worker_group_create(body.into_inner())
        .await
        .context("Failed to create worker group")?;
    Ok(HttpResponse::Ok().json(group))
}

#[put("/{id}")]
async fn update_group(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    body: web::Json<WorkerGroupUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    require_group_name(&body.group_name)?;
    let group = data
        .persistence()
        .worker_group_update(id.into_inner(), body.manager_id, body.group_name.trim())
        .await
        .context("Failed to update worker group")?;
    Ok(HttpResponse::Ok().json(group))
}

#[delete("/{id}")]
async fn delete_group(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .worker_group_delete(id.into_inner())
        .await
        .context("Failed to delete worker group")?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{group_id}/members")]
async fn list_members(
    data: web::Data<AppState>,
    group_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let members = data
        .persistence()
        .worker_group_members(group_id.into_inner())
        .await
        .context("Failed to list worker group members")?;
    Ok(HttpResponse::Ok().json(members))
}

#[post("/{group_id}/members")]
async fn add_member(
    data: web::Data<AppState>,
    group_id: web::Path<i32>,
    body: web::Json<WorkerGroupMemberRequest>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .worker_group_add_member(group_id.into_inner(), body.worker_id)
        .await
        .context("Failed to add worker group member")?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{group_id}/members/{worker_id}")]
async fn remove_member(
    data: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (group_id, worker_id) = path.into_inner();
    data.persistence()
        .worker_group_remove_member(group_id, worker_id)
        .await
        .context("Failed to remove worker group member")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes() -> Scope {
    web::scope("/worker-group")
        .service(list_groups)
        .service(list_groups_by_manager)
        .service(list_groups_by_worker)
        .service(get_group)
        .service(create_group)
        .service(update_group)
        .service(delete_group)
        .service(list_members)
        .service(add_member)
        .service(remove_member)
}
