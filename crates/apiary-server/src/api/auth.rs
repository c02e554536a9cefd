use actix_web::{HttpResponse, Scope, post, web};
use anyhow::Context;
use apiary_auth::service::account;
use apiary_auth::{LoginRequest, RegisterRequest, TokenResponse};

use crate::api::model::MessageResponse;
use crate::error::AppError;
use crate::model::AppState;

/// Exchange credentials for a token. Unknown users and bad passwords answer
/// with the same 401 body.
#[post("/login")]
async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let configuration = &data.configuration;
    let token = account::login(
        data.persistence(),
        &body,
        &configuration.token_secret_key(),
        configuration.token_expire_seconds(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[post("/register")]
async fn register(
    data: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = account::register(data.persistence(), &body)
        .await
        .context("Failed to register user")?;

    tracing::info!(user_id = user.user_id, "User registered");
    Ok(HttpResponse::Created().json(MessageResponse {
        message: format!("User with id {} created successfully", user.user_id),
    }))
}

pub fn routes() -> Scope {
    web::scope("/auth").service(login).service(register)
}
