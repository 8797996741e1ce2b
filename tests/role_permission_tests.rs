//! Role bootstrap and permission updates.

#[path = "test_utils/mod.rs"]
mod test_utils;

use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Iterable, Set};
use test_utils::{context_for, member_with_role, onboarded_tenant, setup_test_db};
use workforce::error::ServiceError;
use workforce::models::enums::RolesEnum;
use workforce::models::role_permission;
use workforce::permissions::{PermissionsEnum, default_role_permissions};
use workforce::repositories::role_permission::RolePermissionFilter;
use workforce::repositories::{RolePermissionRepository, RoleRepository, TenantRepository};
use workforce::seeds::bootstrap_roles;
use workforce::services::role_permissions::{
    UpdateRolePermissionInput, find_for_role, list, list_roles, update_permission,
};

#[tokio::test]
async fn onboarding_seeds_default_permissions_for_every_role() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;

    let roles = RoleRepository::new(&db)
        .find_for_tenants(&[fixture.tenant.id])
        .await?;
    assert_eq!(roles.len(), RolesEnum::iter().count());

    for role in &roles {
        let rows = RolePermissionRepository::new(&db)
            .find_for_role(role.id)
            .await?;
        assert!(rows.iter().all(|row| row.enabled && row.tenant_id == fixture.tenant.id));

        let seeded: BTreeSet<&str> = rows.iter().map(|row| row.permission.as_str()).collect();
        let expected: BTreeSet<&str> = default_role_permissions(role.name)
            .iter()
            .map(PermissionsEnum::as_str)
            .collect();
        assert_eq!(seeded, expected, "permissions of {}", role.name.as_str());
        assert_eq!(rows.len(), expected.len());
    }
    Ok(())
}

#[tokio::test]
async fn roles_are_isolated_per_tenant() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let acme = onboarded_tenant(&db, "Acme").await?;
    let globex = onboarded_tenant(&db, "Globex").await?;

    let acme_ctx = acme.owner_context(&db).await?;
    let roles = list_roles(&db, &acme_ctx).await?;
    assert!(roles.iter().all(|role| role.tenant_id == acme.tenant.id));

    let foreign_role = RoleRepository::new(&db)
        .find_by_name(globex.tenant.id, RolesEnum::Employee)
        .await?
        .expect("globex employee role");
    let result = find_for_role(&db, &acme_ctx, foreign_role.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let rows = list(&db, &acme_ctx, &RolePermissionFilter::default()).await?;
    assert!(rows.iter().all(|row| row.tenant_id == acme.tenant.id));
    Ok(())
}

#[tokio::test]
async fn permission_rows_can_be_toggled_except_for_super_admin() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let roles = RoleRepository::new(&db);

    let employee = roles
        .find_by_name(fixture.tenant.id, RolesEnum::Employee)
        .await?
        .expect("employee role");
    let row = find_for_role(&db, &ctx, employee.id)
        .await?
        .into_iter()
        .next()
        .expect("employee has permissions");

    let updated = update_permission(
        &db,
        &ctx,
        row.id,
        UpdateRolePermissionInput {
            enabled: Some(false),
            description: Some("Paused".to_string()),
        },
    )
    .await?;
    assert!(!updated.enabled);
    assert_eq!(updated.description.as_deref(), Some("Paused"));

    let disabled = list(
        &db,
        &ctx,
        &RolePermissionFilter {
            role_id: Some(employee.id),
            enabled: Some(false),
        },
    )
    .await?;
    assert_eq!(disabled.len(), 1);
    assert_eq!(disabled[0].id, row.id);

    let super_admin = roles
        .find_by_name(fixture.tenant.id, RolesEnum::SuperAdmin)
        .await?
        .expect("super admin role");
    let locked = find_for_role(&db, &ctx, super_admin.id)
        .await?
        .into_iter()
        .next()
        .expect("super admin has permissions");
    let result = update_permission(
        &db,
        &ctx,
        locked.id,
        UpdateRolePermissionInput {
            enabled: Some(false),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn admins_cannot_change_role_permissions() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let admin = member_with_role(&db, fixture.tenant.id, RolesEnum::Admin).await?;
    let admin_ctx = context_for(&db, admin.id).await?;

    let employee = RoleRepository::new(&db)
        .find_by_name(fixture.tenant.id, RolesEnum::Employee)
        .await?
        .expect("employee role");
    let row = find_for_role(&db, &admin_ctx, employee.id)
        .await?
        .into_iter()
        .next()
        .expect("employee has permissions");

    let result = update_permission(
        &db,
        &admin_ctx,
        row.id,
        UpdateRolePermissionInput {
            enabled: Some(false),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn bootstrap_fills_bare_tenants_and_is_idempotent() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let seeded = onboarded_tenant(&db, "Acme").await?;
    let bare = TenantRepository::new(&db).create_tenant("Initech").await?;

    let expected_permissions: usize = RolesEnum::iter()
        .map(|role| default_role_permissions(role).len())
        .sum();

    let report = bootstrap_roles(&db).await?;
    assert_eq!(report.tenants, 2);
    assert_eq!(report.roles_created, RolesEnum::iter().count());
    assert_eq!(report.permissions_created, expected_permissions);

    let bare_roles = RoleRepository::new(&db)
        .find_for_tenants(&[bare.id])
        .await?;
    assert_eq!(bare_roles.len(), RolesEnum::iter().count());

    let again = bootstrap_roles(&db).await?;
    assert_eq!(again.roles_created, 0);
    assert_eq!(again.permissions_created, 0);

    let seeded_roles = RoleRepository::new(&db)
        .find_for_tenants(&[seeded.tenant.id])
        .await?;
    assert_eq!(seeded_roles.len(), RolesEnum::iter().count());
    Ok(())
}

#[tokio::test]
async fn context_keeps_only_known_enabled_permissions() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let employee = member_with_role(&db, fixture.tenant.id, RolesEnum::Employee).await?;
    let role_id = employee.role_id.expect("employee has a role");

    let now = Utc::now();
    for (permission, enabled) in [("LEGACY_REPORTS_VIEW", true), ("ORG_INVITE_EDIT", false)] {
        role_permission::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            tenant_id: Set(fixture.tenant.id),
            role_id: Set(role_id),
            permission: Set(permission.to_string()),
            enabled: Set(enabled),
            description: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(&db)
        .await?;
    }

    let ctx = context_for(&db, employee.id).await?;
    let expected: HashSet<PermissionsEnum> = default_role_permissions(RolesEnum::Employee)
        .iter()
        .copied()
        .collect();
    assert_eq!(ctx.permissions, expected);
    assert!(!ctx.has_permission(PermissionsEnum::OrgInviteEdit));
    Ok(())
}
