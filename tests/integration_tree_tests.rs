//! Registration and maintenance of integration trees.

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{context_for, member_with_role, onboarded_tenant, setup_test_db, test_crypto_key};
use uuid::Uuid;
use workforce::crypto::{SEALED_PREFIX, is_sealed};
use workforce::error::{RepositoryError, ServiceError};
use workforce::models::enums::{IntegrationEntity, RolesEnum};
use workforce::repositories::user::NewUser;
use workforce::repositories::{IntegrationRepository, RoleRepository, UserRepository};
use workforce::services::integration::{
    AddIntegrationInput, EntitySettingInput, EntitySettingUpdate, IntegrationService,
    SettingInput, TiedEntityInput, TiedEntityUpdate,
};

fn hubstaff_input(organization_id: Uuid) -> AddIntegrationInput {
    AddIntegrationInput {
        name: "Hubstaff".to_string(),
        organization_id,
        settings: vec![
            SettingInput {
                setting_name: "client_id".to_string(),
                setting_value: "hs-client".to_string(),
            },
            SettingInput {
                setting_name: "client_secret".to_string(),
                setting_value: "hs-secret".to_string(),
            },
        ],
        entity_settings: vec![
            EntitySettingInput {
                entity: IntegrationEntity::Project,
                sync: true,
                tied_entities: vec![TiedEntityInput {
                    entity: IntegrationEntity::Task,
                    sync: true,
                }],
            },
            EntitySettingInput {
                entity: IntegrationEntity::Activity,
                sync: false,
                tied_entities: vec![
                    TiedEntityInput {
                        entity: IntegrationEntity::TimeSlot,
                        sync: true,
                    },
                    TiedEntityInput {
                        entity: IntegrationEntity::Screenshot,
                        sync: false,
                    },
                ],
            },
        ],
    }
}

#[tokio::test]
async fn add_integration_builds_the_whole_tree() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let service = IntegrationService::new(&db, &key);

    let tree = service
        .add_integration(&ctx, hubstaff_input(fixture.organization.id))
        .await?;

    assert_eq!(tree.integration.name, "Hubstaff");
    assert_eq!(tree.integration.tenant_id, fixture.tenant.id);
    assert_eq!(tree.integration.organization_id, fixture.organization.id);
    assert_eq!(tree.settings.len(), 2);
    assert!(tree.settings.iter().all(|s| s.integration_id == tree.integration.id));
    assert_eq!(tree.entity_settings.len(), 2);

    let (project, project_tied) = tree
        .entity_settings
        .iter()
        .find(|(setting, _)| setting.entity == IntegrationEntity::Project)
        .expect("project entity setting");
    assert!(project.sync);
    assert_eq!(project_tied.len(), 1);
    assert_eq!(project_tied[0].entity, IntegrationEntity::Task);

    let (activity, activity_tied) = tree
        .entity_settings
        .iter()
        .find(|(setting, _)| setting.entity == IntegrationEntity::Activity)
        .expect("activity entity setting");
    assert!(!activity.sync);
    assert_eq!(activity_tied.len(), 2);

    let reread = service.get_tree(&ctx, tree.integration.id).await?;
    assert_eq!(reread.settings.len(), 2);
    assert_eq!(reread.entity_settings.len(), 2);
    assert_eq!(service.list(&ctx).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn secret_settings_are_sealed_at_rest_and_masked_on_read() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let service = IntegrationService::new(&db, &key);

    let tree = service
        .add_integration(&ctx, hubstaff_input(fixture.organization.id))
        .await?;

    let stored = IntegrationRepository::new(&db)
        .settings(tree.integration.id)
        .await?;
    let secret = stored
        .iter()
        .find(|s| s.setting_name == "client_secret")
        .expect("client_secret stored");
    assert!(secret.setting_value.starts_with(SEALED_PREFIX));
    assert!(!secret.setting_value.contains("hs-secret"));
    let plain = stored
        .iter()
        .find(|s| s.setting_name == "client_id")
        .expect("client_id stored");
    assert_eq!(plain.setting_value, "hs-client");
    assert!(!is_sealed(&plain.setting_value));

    let listed = service.list_settings(&ctx, tree.integration.id).await?;
    let masked = listed
        .iter()
        .find(|s| s.setting_name == "client_secret")
        .expect("client_secret listed");
    assert_ne!(masked.setting_value, "hs-secret");
    assert!(!masked.setting_value.starts_with(SEALED_PREFIX));

    assert_eq!(
        service
            .setting_value(&ctx, tree.integration.id, "client_secret")
            .await?,
        "hs-secret"
    );

    service
        .upsert_setting(&ctx, tree.integration.id, "access_token", "token-1")
        .await?;
    service
        .upsert_setting(&ctx, tree.integration.id, "access_token", "token-2")
        .await?;
    assert_eq!(
        service
            .setting_value(&ctx, tree.integration.id, "access_token")
            .await?,
        "token-2"
    );
    assert_eq!(service.list_settings(&ctx, tree.integration.id).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn entity_sync_flags_can_be_toggled() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let service = IntegrationService::new(&db, &key);

    let tree = service
        .add_integration(&ctx, hubstaff_input(fixture.organization.id))
        .await?;
    let (activity, tied) = tree
        .entity_settings
        .iter()
        .find(|(setting, _)| setting.entity == IntegrationEntity::Activity)
        .cloned()
        .expect("activity entity setting");
    let screenshot = tied
        .iter()
        .find(|t| t.entity == IntegrationEntity::Screenshot)
        .expect("screenshot tied entity");

    let updated = service
        .update_entity_settings(
            &ctx,
            tree.integration.id,
            vec![EntitySettingUpdate {
                id: activity.id,
                sync: true,
                tied_entities: vec![TiedEntityUpdate {
                    id: screenshot.id,
                    sync: true,
                }],
            }],
        )
        .await?;

    let (activity, tied) = updated
        .iter()
        .find(|(setting, _)| setting.id == activity.id)
        .expect("activity still present");
    assert!(activity.sync);
    assert!(tied.iter().all(|t| t.sync));

    let result = service
        .update_entity_settings(
            &ctx,
            tree.integration.id,
            vec![EntitySettingUpdate {
                id: Uuid::new_v4(),
                sync: false,
                tied_entities: Vec::new(),
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Repository(RepositoryError::NotFound(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn integrations_are_scoped_to_the_tenant_and_permission() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let acme = onboarded_tenant(&db, "Acme").await?;
    let globex = onboarded_tenant(&db, "Globex").await?;
    let service = IntegrationService::new(&db, &key);

    let tree = service
        .add_integration(
            &acme.owner_context(&db).await?,
            hubstaff_input(acme.organization.id),
        )
        .await?;

    let globex_ctx = globex.owner_context(&db).await?;
    assert!(service.list(&globex_ctx).await?.is_empty());
    assert!(service.get_tree(&globex_ctx, tree.integration.id).await.is_err());
    assert!(
        service
            .add_integration(&globex_ctx, hubstaff_input(acme.organization.id))
            .await
            .is_err()
    );

    let employee = member_with_role(&db, acme.tenant.id, RolesEnum::Employee).await?;
    let employee_ctx = context_for(&db, employee.id).await?;
    assert!(matches!(
        service
            .add_integration(&employee_ctx, hubstaff_input(acme.organization.id))
            .await,
        Err(ServiceError::Forbidden(_))
    ));
    Ok(())
}

#[tokio::test]
async fn unknown_tenant_is_not_found() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;

    let admin_role = RoleRepository::new(&db)
        .find_by_name(fixture.tenant.id, RolesEnum::Admin)
        .await?
        .expect("admin role");
    let orphan = UserRepository::new(&db)
        .create(NewUser {
            email: "orphan@acme.test".to_string(),
            tenant_id: Some(Uuid::new_v4()),
            role_id: Some(admin_role.id),
            ..NewUser::default()
        })
        .await?;
    let ctx = context_for(&db, orphan.id).await?;

    let result = IntegrationService::new(&db, &key)
        .add_integration(&ctx, hubstaff_input(fixture.organization.id))
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    Ok(())
}
