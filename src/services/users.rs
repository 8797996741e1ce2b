//! User registration and login.

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{hash_password, issue_session_token, verify_password};
use crate::config::AppConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::Model as UserModel;
use crate::repositories::UserRepository;
use crate::repositories::user::NewUser;
use crate::services::normalize_email;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Tenant, role and organization a new user is placed into.
#[derive(Debug, Clone, Copy)]
pub struct Membership {
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserModel,
}

/// Create a user with a hashed password, optionally already attached to a
/// tenant and organization.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn register<C: ConnectionTrait>(
    db: &C,
    input: RegisterInput,
    membership: Option<Membership>,
) -> ServiceResult<UserModel> {
    let email = normalize_email(&input.email)?;
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let users = UserRepository::new(db);
    if users.find_by_email(&email).await?.is_some() {
        return Err(ServiceError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let user = users
        .create(NewUser {
            email,
            first_name: input.first_name,
            last_name: input.last_name,
            hash: Some(hash_password(&input.password)?),
            tenant_id: membership.map(|m| m.tenant_id),
            role_id: membership.map(|m| m.role_id),
        })
        .await?;

    if let Some(Membership {
        tenant_id,
        organization_id: Some(organization_id),
        ..
    }) = membership
    {
        users
            .add_to_organization(user.id, tenant_id, organization_id)
            .await?;
    }

    info!(user_id = %user.id, "Registered user");
    Ok(user)
}

/// Check the credentials and issue a session token.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    input: LoginInput,
) -> ServiceResult<Session> {
    let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

    let email = normalize_email(&input.email).map_err(|_| invalid())?;
    let user = UserRepository::new(db)
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let Some(hash) = user.hash.as_deref() else {
        warn!(user_id = %user.id, "Login attempt for user without password");
        return Err(invalid());
    };
    if !verify_password(&input.password, hash) {
        return Err(invalid());
    }

    let token = issue_session_token(config, user.id)?;
    Ok(Session { token, user })
}
