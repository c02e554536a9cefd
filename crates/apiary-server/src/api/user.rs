//! User management, restricted to managers and admins

use actix_web::{HttpResponse, Scope, delete, get, post, put, web};
use anyhow::Context;
use apiary_auth::service::password::hash_password;
use apiary_common::{ApiaryError, Role};
use apiary_persistence::{RegionPersistence, User, UserPersistence};

use crate::api::model::{UserRegionsRequest, UserRoleRequest};
use crate::error::AppError;
use crate::model::AppState;

fn parse_role(label: &str) -> Result<Role, AppError> {
    label
        .parse::<Role>()
        .map_err(|e| ApiaryError::InvalidInput(e).into())
}

#[get("")]
async fn list_users(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = data
        .persistence()
        .user_list()
        .await
        .context("Failed to list users")?;
    Ok(HttpResponse::Ok().json(users))
}

/// Workers that belong to no group
#[get("/free")]
async fn list_free_users(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = data
        .persistence()
        .user_list_free_workers()
        .await
        .context("Failed to list free users")?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
async fn get_user(data: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let user = data
        .persistence()
        .user_get(id.into_inner())
        .await
        .context("Failed to get user")?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/{id}/allowed-regions")]
async fn get_user_allowed_regions(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let regions = data
        .persistence()
        .allowed_region_list_by_user(id.into_inner())
        .await
        .context("Failed to get allowed regions of user")?;
    Ok(HttpResponse::Ok().json(regions))
}

#[post("")]
async fn create_user(
    data: web::Data<AppState>,
    body: web::Json<User>,
) -> Result<HttpResponse, AppError> {
    let mut user = body.into_inner();
    if user.password.is_empty() {
        return Err(ApiaryError::InvalidInput("password is required".to_string()).into());
    }
    user.role = parse_role(&user.role)?.as_str().to_string();
    user.password = hash_password(&user.password)?;

    let user = data
        .persistence()
        .user_create(user)
        .await
        .context("Failed to create user")?;
    Ok(HttpResponse::Ok().json(user))
}

/// Full update. An empty password leaves the stored hash untouched.
#[put("")]
async fn update_user(
    data: web::Data<AppState>,
    body: web::Json<User>,
) -> Result<HttpResponse, AppError> {
    let mut user = body.into_inner();
    user.role = parse_role(&user.role)?.as_str().to_string();
    if !user.password.is_empty() {
        user.password = hash_password(&user.password)?;
    }

    let user = data
        .persistence()
        .user_update(user)
        .await
        .context("Failed to update user")?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/role")]
async fn update_user_role(
    data: web::Data<AppState>,
    body: web::Json<UserRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let role = parse_role(&body.role)?;
    let user = data
        .persistence()
        .user_update_role(body.user_id, role)
        .await
        .context("Failed to update user role")?;

    tracing::info!(user_id = user.user_id, role = %role, "User role changed");
    Ok(HttpResponse::Ok().json(user))
}

/// Replace the user's allowed regions and return the new set
#[put("/allowed-regions")]
async fn update_user_allowed_regions(
    data: web::Data<AppState>,
    body: web::Json<UserRegionsRequest>,
) -> Result<HttpResponse, AppError> {
    let regions = data
        .persistence()
        .user_replace_allowed_regions(body.user_id, &body.region_ids)
        .await
        .context("Failed to update allowed regions of user")?;
    Ok(HttpResponse::Ok().json(regions))
}

#[delete("/{id}")]
async fn delete_user(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    data.persistence()
        .user_delete(id.into_inner())
        .await
        .context("Failed to delete user")?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes() -> Scope {
    web::scope("/user")
        .service(list_users)
        .service(list_free_users)
        .service(update_user_role)
        .service(update_user_allowed_regions)
        .service(get_user)
        .service(get_user_allowed_regions)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
}
