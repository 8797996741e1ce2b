//! Test utilities for database testing.
//!
//! In-memory SQLite with all migrations applied, plus fixtures for an
//! onboarded tenant and members holding specific roles.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use workforce::config::AppConfig;
use workforce::context::RequestContext;
use workforce::crypto::CryptoKey;
use workforce::integrations::HubstaffClient;
use workforce::mail::log::MemoryMailer;
use workforce::models::enums::RolesEnum;
use workforce::models::organization::Model as OrganizationModel;
use workforce::models::tenant::Model as TenantModel;
use workforce::models::user::Model as UserModel;
use workforce::repositories::organization::NewOrganization;
use workforce::repositories::user::NewUser;
use workforce::repositories::{OrganizationRepository, RoleRepository, UserRepository};
use workforce::server::AppState;
use workforce::services::tenant::{CreateTenantInput, onboard_tenant};
use workforce::services::users::{RegisterInput, register};

pub const TEST_PASSWORD: &str = "correct-horse";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // Fixtures reference rows across tenants freely; keep SQLite from
    // enforcing foreign keys the way Postgres would.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        crypto_key: Some(vec![7u8; 32]),
        client_base_url: "https://app.workforce.test".to_string(),
        ..AppConfig::default()
    }
}

pub fn test_crypto_key() -> CryptoKey {
    CryptoKey::new(vec![7u8; 32]).expect("32 byte key")
}

/// Application state over `db`, with an in-memory mailer and Hubstaff pointed
/// at `hubstaff_base` when given.
pub fn test_state(db: DatabaseConnection, hubstaff_base: Option<&str>) -> (AppState, MemoryMailer) {
    let mut config = test_config();
    if let Some(base) = hubstaff_base {
        config.hubstaff_oauth_base = base.to_string();
        config.hubstaff_api_base = base.to_string();
    }
    let mailer = MemoryMailer::new();
    let hubstaff = HubstaffClient::from_config(&config).expect("valid Hubstaff endpoints");

    let state = AppState {
        config: Arc::new(config),
        db,
        crypto_key: Arc::new(test_crypto_key()),
        mailer: Arc::new(mailer.clone()),
        hubstaff,
    };
    (state, mailer)
}

/// A tenant onboarded by its `SUPER_ADMIN` owner, with one organization.
pub struct TenantFixture {
    pub tenant: TenantModel,
    pub owner: UserModel,
    pub organization: OrganizationModel,
}

impl TenantFixture {
    pub async fn owner_context(&self, db: &DatabaseConnection) -> Result<RequestContext> {
        context_for(db, self.owner.id).await
    }
}

pub async fn context_for(db: &DatabaseConnection, user_id: Uuid) -> Result<RequestContext> {
    RequestContext::load(db, user_id)
        .await
        .context("loading request context")
}

/// Register a user that belongs to no tenant yet.
pub async fn register_user(db: &DatabaseConnection, email: &str) -> Result<UserModel> {
    Ok(register(
        db,
        RegisterInput {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
        },
        None,
    )
    .await?)
}

/// Register an owner, onboard a tenant for them and add one organization.
pub async fn onboarded_tenant(db: &DatabaseConnection, name: &str) -> Result<TenantFixture> {
    let owner = register_user(db, &format!("owner@{}.test", name.to_lowercase())).await?;
    let ctx = context_for(db, owner.id).await?;

    let tenant = onboard_tenant(
        db,
        &ctx,
        CreateTenantInput {
            name: name.to_string(),
        },
    )
    .await?;

    let organization = OrganizationRepository::new(db)
        .create(tenant.id, NewOrganization::named(format!("{name} HQ")))
        .await?;

    let owner = UserRepository::new(db)
        .find_by_id(owner.id)
        .await?
        .context("owner disappeared")?;

    Ok(TenantFixture {
        tenant,
        owner,
        organization,
    })
}

/// A member of `tenant_id` holding the built-in `role`.
pub async fn member_with_role(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    role: RolesEnum,
) -> Result<UserModel> {
    let role = RoleRepository::new(db)
        .find_by_name(tenant_id, role)
        .await?
        .context("role not seeded")?;

    Ok(UserRepository::new(db)
        .create(NewUser {
            email: format!("{}-{}@members.test", role.name.as_str().to_lowercase(), Uuid::new_v4().simple()),
            tenant_id: Some(tenant_id),
            role_id: Some(role.id),
            ..NewUser::default()
        })
        .await?)
}
