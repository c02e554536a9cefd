//! Login and registration over the user store

use std::sync::LazyLock;

use apiary_common::{ApiaryError, Role};
use apiary_persistence::{User, UserPersistence};
use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use crate::model::{INVALID_LOGIN_MESSAGE, LoginRequest, RegisterRequest};
use crate::service::{password, token};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid regex pattern")
});

/// Whether a login identifier is matched against emails rather than usernames
pub fn is_email(identifier: &str) -> bool {
    EMAIL_PATTERN.is_match(identifier)
}

/// The slice of the user store the account flows need
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    async fn create_user(&self, user: User) -> anyhow::Result<User>;

    async fn touch_last_login(&self, user_id: i32) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: UserPersistence + ?Sized> CredentialStore for T {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.user_find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.user_find_by_username(username).await
    }

    async fn create_user(&self, user: User) -> anyhow::Result<User> {
        self.user_create(user).await
    }

    async fn touch_last_login(&self, user_id: i32) -> anyhow::Result<()> {
        self.user_touch_last_login(user_id).await
    }
}

fn invalid_login() -> anyhow::Error {
    ApiaryError::Unauthenticated(INVALID_LOGIN_MESSAGE.to_string()).into()
}

/// Verify credentials and issue a token.
///
/// Unknown identifiers and wrong passwords produce the same error. Store
/// failures during lookup propagate as-is.
pub async fn login<S>(
    store: &S,
    request: &LoginRequest,
    secret_key: &str,
    expire_seconds: i64,
) -> anyhow::Result<String>
where
    S: CredentialStore + ?Sized,
{
    let identifier = request.email_or_username.trim();
    let user = if is_email(identifier) {
        store.find_by_email(identifier).await?
    } else {
        store.find_by_username(identifier).await?
    };

    let Some(user) = user else {
        password::verify_dummy_password(&request.password);
        return Err(invalid_login());
    };
    if !password::verify_password(&request.password, &user.password) {
        return Err(invalid_login());
    }

    let token = token::encode_jwt_token(user.user_id, &user.role, secret_key, expire_seconds)
        .map_err(|e| anyhow::anyhow!(e).context("failed to sign token"))?;

    if let Err(e) = store.touch_last_login(user.user_id).await {
        warn!(user_id = user.user_id, "Failed to record last login: {:#}", e);
    }

    Ok(token)
}

/// Create a WORKER account with a hashed password
pub async fn register<S>(store: &S, request: &RegisterRequest) -> anyhow::Result<User>
where
    S: CredentialStore + ?Sized,
{
    let missing = [
        ("email", &request.email),
        ("password", &request.password),
        ("full_name", &request.full_name),
        ("username", &request.username),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());
    if let Some((field, _)) = missing {
        return Err(ApiaryError::InvalidInput(format!("{} is required", field)).into());
    }

    let user = User {
        user_id: 0,
        username: request.username.trim().to_string(),
        full_name: request.full_name.clone(),
        role: Role::Worker.as_str().to_string(),
        email: request.email.trim().to_string(),
        password: password::hash_password(&request.password)?,
        last_login: None,
    };
    store.create_user(user).await
}
