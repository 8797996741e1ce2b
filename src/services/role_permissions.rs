//! Role and permission bootstrap.
//!
//! A role's permissions come from the static table in
//! [`crate::permissions::default_role_permissions`]: one enabled row per
//! entry. The same fan-out serves a single new role and the bulk seeding of
//! whole tenants.

use metrics::counter;
use sea_orm::{ConnectionTrait, Iterable};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::RolesEnum;
use crate::models::role::Model as RoleModel;
use crate::models::role_permission::Model as RolePermissionModel;
use crate::models::tenant::Model as TenantModel;
use crate::permissions::{PermissionsEnum, default_role_permissions};
use crate::repositories::role_permission::{NewRolePermission, RolePermissionFilter};
use crate::repositories::{RolePermissionRepository, RoleRepository};

/// Partial update of one permission row.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateRolePermissionInput {
    pub enabled: Option<bool>,
    pub description: Option<String>,
}

/// Insert the default permission rows of `role` for `tenant`.
#[instrument(skip_all, fields(tenant_id = %tenant.id, role = %role.name))]
pub async fn update_roles<C: ConnectionTrait>(
    db: &C,
    tenant: &TenantModel,
    role: &RoleModel,
) -> ServiceResult<Vec<RolePermissionModel>> {
    let rows = default_role_permissions(role.name)
        .iter()
        .map(|permission| NewRolePermission {
            tenant_id: tenant.id,
            role_id: role.id,
            permission: permission.as_str().to_string(),
            enabled: true,
            description: None,
        })
        .collect();

    let created = RolePermissionRepository::new(db).create_many(rows).await?;
    counter!("role_permissions_seeded_total").increment(created.len() as u64);

    Ok(created)
}

/// Seed every role of every tenant. Roles whose tenant is not in `tenants`
/// are left alone.
#[instrument(skip_all, fields(tenants = tenants.len(), roles = roles.len()))]
pub async fn seed_for_tenants<C: ConnectionTrait>(
    db: &C,
    tenants: &[TenantModel],
    roles: &[RoleModel],
) -> ServiceResult<Vec<RolePermissionModel>> {
    let mut created = Vec::new();

    for tenant in tenants {
        for role in roles.iter().filter(|role| role.tenant_id == tenant.id) {
            created.extend(update_roles(db, tenant, role).await?);
        }
    }

    info!(permissions = created.len(), "Seeded role permissions");
    Ok(created)
}

/// One role per built-in role name.
pub async fn create_roles_for_tenant<C: ConnectionTrait>(
    db: &C,
    tenant: &TenantModel,
) -> ServiceResult<Vec<RoleModel>> {
    let names: Vec<RolesEnum> = RolesEnum::iter().collect();
    Ok(RoleRepository::new(db)
        .create_roles(tenant.id, &names)
        .await?)
}

/// Toggle or describe a permission row. Rows of the `SUPER_ADMIN` role are
/// immutable.
#[instrument(skip(db, ctx, input), fields(user_id = %ctx.user_id()))]
pub async fn update_permission<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    id: Uuid,
    input: UpdateRolePermissionInput,
) -> ServiceResult<RolePermissionModel> {
    ctx.require_permission(PermissionsEnum::ChangeRolesPermissions)?;
    let tenant_id = ctx.tenant_id()?;

    let repo = RolePermissionRepository::new(db);
    let (permission, role) = repo
        .find_with_role(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Role permission not found"))?;

    if role.name == RolesEnum::SuperAdmin {
        return Err(ServiceError::bad_request(
            "Permissions of the SUPER_ADMIN role cannot be changed",
        ));
    }

    Ok(repo
        .update(permission, input.enabled, input.description)
        .await?)
}

/// Roles of the caller's tenant.
pub async fn list_roles<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
) -> ServiceResult<Vec<RoleModel>> {
    let tenant_id = ctx.tenant_id()?;
    Ok(RoleRepository::new(db)
        .find_for_tenants(&[tenant_id])
        .await?)
}

/// Permissions of one role in the caller's tenant.
pub async fn find_for_role<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    role_id: Uuid,
) -> ServiceResult<Vec<RolePermissionModel>> {
    let tenant_id = ctx.tenant_id()?;

    let role = RoleRepository::new(db)
        .find_by_id(role_id)
        .await?
        .filter(|role| role.tenant_id == tenant_id)
        .ok_or_else(|| ServiceError::not_found("Role not found"))?;

    Ok(RolePermissionRepository::new(db)
        .find_for_role(role.id)
        .await?)
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    filter: &RolePermissionFilter,
) -> ServiceResult<Vec<RolePermissionModel>> {
    let tenant_id = ctx.tenant_id()?;
    Ok(RolePermissionRepository::new(db)
        .list(tenant_id, filter)
        .await?)
}
