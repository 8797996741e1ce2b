#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{context_for, onboarded_tenant, register_user, setup_test_db};
use workforce::error::ServiceError;
use workforce::models::enums::RolesEnum;
use workforce::permissions::PermissionsEnum;
use workforce::repositories::{RoleRepository, TenantRepository, UserRepository};
use workforce::services::tenant::{CreateTenantInput, current_tenant, onboard_tenant};

#[tokio::test]
async fn onboarding_makes_the_caller_super_admin() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;

    assert_eq!(fixture.owner.tenant_id, Some(fixture.tenant.id));
    let super_admin = RoleRepository::new(&db)
        .find_by_name(fixture.tenant.id, RolesEnum::SuperAdmin)
        .await?
        .expect("super admin role");
    assert_eq!(fixture.owner.role_id, Some(super_admin.id));

    let ctx = fixture.owner_context(&db).await?;
    for permission in PermissionsEnum::ALL {
        assert!(ctx.has_permission(*permission), "missing {permission}");
    }

    let tenant = current_tenant(&db, &ctx).await?;
    assert_eq!(tenant.id, fixture.tenant.id);
    assert_eq!(tenant.name, "Acme");
    Ok(())
}

#[tokio::test]
async fn a_user_can_onboard_only_one_tenant() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;

    let result = onboard_tenant(
        &db,
        &ctx,
        CreateTenantInput {
            name: "Acme Two".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    assert_eq!(TenantRepository::new(&db).list_tenants().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_onboarding_leaves_no_partial_tenant() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let user = register_user(&db, "solo@acme.test").await?;
    let ctx = context_for(&db, user.id).await?;

    let result = onboard_tenant(
        &db,
        &ctx,
        CreateTenantInput {
            name: "   ".to_string(),
        },
    )
    .await;
    assert!(result.is_err());

    assert!(TenantRepository::new(&db).list_tenants().await?.is_empty());
    let user = UserRepository::new(&db)
        .find_by_id(user.id)
        .await?
        .expect("user still exists");
    assert_eq!(user.tenant_id, None);
    assert_eq!(user.role_id, None);
    Ok(())
}

#[tokio::test]
async fn users_without_a_tenant_have_no_current_tenant() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let user = register_user(&db, "solo@acme.test").await?;
    let ctx = context_for(&db, user.id).await?;

    assert!(ctx.role.is_none());
    assert!(matches!(
        current_tenant(&db, &ctx).await,
        Err(ServiceError::Forbidden(_))
    ));
    Ok(())
}
