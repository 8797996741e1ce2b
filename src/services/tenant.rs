//! Tenant onboarding.

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::RolesEnum;
use crate::models::tenant::Model as TenantModel;
use crate::repositories::{TenantRepository, UserRepository};
use crate::services::role_permissions;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateTenantInput {
    pub name: String,
}

/// Create a tenant for a user that has none, with the full role set and its
/// default permissions, and make the user its `SUPER_ADMIN`.
#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id()))]
pub async fn onboard_tenant(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    input: CreateTenantInput,
) -> ServiceResult<TenantModel> {
    if ctx.user.tenant_id.is_some() || ctx.user.role_id.is_some() {
        return Err(ServiceError::bad_request(
            "Tenant already exists for this user",
        ));
    }

    let txn = db.begin().await?;

    let tenant = TenantRepository::new(&txn)
        .create_tenant(&input.name)
        .await?;

    let roles = role_permissions::create_roles_for_tenant(&txn, &tenant).await?;
    role_permissions::seed_for_tenants(&txn, std::slice::from_ref(&tenant), &roles).await?;

    let super_admin = roles
        .iter()
        .find(|role| role.name == RolesEnum::SuperAdmin)
        .ok_or_else(|| ServiceError::Internal(anyhow::anyhow!("SUPER_ADMIN role was not created")))?;

    UserRepository::new(&txn)
        .assign_tenant(ctx.user.clone(), tenant.id, super_admin.id)
        .await?;

    txn.commit().await?;

    counter!("tenants_onboarded_total").increment(1);
    info!(tenant_id = %tenant.id, roles = roles.len(), "Onboarded tenant");

    Ok(tenant)
}

/// The caller's own tenant.
pub async fn current_tenant<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
) -> ServiceResult<TenantModel> {
    let tenant_id = ctx.tenant_id()?;
    TenantRepository::new(db)
        .get_tenant_by_id(tenant_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Tenant not found"))
}
