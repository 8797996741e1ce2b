//! Integration configuration tree.
//!
//! An integration registered for a tenant owns named settings and entity
//! settings; each entity setting owns the tied entities synchronized with it.
//! Secret setting values are sealed with the service crypto key and never
//! returned in clear by listing operations.

use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::crypto::{CryptoKey, SettingAad, open_setting_value, seal_setting_value};
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::IntegrationEntity;
use crate::models::integration_setting::Model as SettingModel;
use crate::models::integration_tenant::Model as IntegrationModel;
use crate::models::{IntegrationTenant, Organization};
use crate::permissions::PermissionsEnum;
use crate::repositories::integration::{EntitySettingTree, NewEntitySetting, NewTiedEntity};
use crate::repositories::{IntegrationRepository, TenantRepository, TenantScopedRepository};

/// Settings whose values are stored sealed and shown masked.
pub const SECRET_SETTINGS: &[&str] = &["client_secret", "access_token", "refresh_token"];

const MASK: &str = "********";

pub fn is_secret_setting(name: &str) -> bool {
    SECRET_SETTINGS.contains(&name)
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SettingInput {
    pub setting_name: String,
    pub setting_value: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct TiedEntityInput {
    pub entity: IntegrationEntity,
    #[serde(default = "default_sync")]
    pub sync: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct EntitySettingInput {
    pub entity: IntegrationEntity,
    #[serde(default = "default_sync")]
    pub sync: bool,
    #[serde(default)]
    pub tied_entities: Vec<TiedEntityInput>,
}

fn default_sync() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddIntegrationInput {
    pub name: String,
    pub organization_id: Uuid,
    #[serde(default)]
    pub settings: Vec<SettingInput>,
    #[serde(default)]
    pub entity_settings: Vec<EntitySettingInput>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct TiedEntityUpdate {
    pub id: Uuid,
    pub sync: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct EntitySettingUpdate {
    pub id: Uuid,
    pub sync: bool,
    #[serde(default)]
    pub tied_entities: Vec<TiedEntityUpdate>,
}

/// An integration with everything hanging off it.
#[derive(Debug, Clone)]
pub struct IntegrationTree {
    pub integration: IntegrationModel,
    pub settings: Vec<SettingModel>,
    pub entity_settings: EntitySettingTree,
}

pub struct IntegrationService<'a> {
    db: &'a DatabaseConnection,
    crypto_key: &'a CryptoKey,
}

impl<'a> IntegrationService<'a> {
    pub fn new(db: &'a DatabaseConnection, crypto_key: &'a CryptoKey) -> Self {
        Self { db, crypto_key }
    }

    /// Register an integration for the caller's tenant with its whole tree.
    #[instrument(skip(self, ctx, input), fields(user_id = %ctx.user_id(), name = %input.name))]
    pub async fn add_integration(
        &self,
        ctx: &RequestContext,
        input: AddIntegrationInput,
    ) -> ServiceResult<IntegrationTree> {
        ctx.require_permission(PermissionsEnum::IntegrationEdit)?;
        let tenant_id = ctx.tenant_id()?;

        let tenant = TenantRepository::new(self.db)
            .get_tenant_by_id(tenant_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant not found"))?;
        let organization = TenantScopedRepository::<_, Organization>::new(self.db, tenant.id)
            .get(input.organization_id, "Organization")
            .await?;

        let txn = self.db.begin().await?;
        let repo = IntegrationRepository::new(&txn);

        let integration = repo
            .create_integration(tenant.id, organization.id, &input.name)
            .await?;

        let settings = input
            .settings
            .into_iter()
            .map(|setting| {
                let value = self.store_value(&integration, &setting.setting_name, &setting.setting_value)?;
                Ok((setting.setting_name, value))
            })
            .collect::<ServiceResult<Vec<_>>>()?;
        let settings = repo.create_settings(&integration, settings).await?;

        let entity_settings = input
            .entity_settings
            .into_iter()
            .map(|entity_setting| NewEntitySetting {
                entity: entity_setting.entity,
                sync: entity_setting.sync,
                tied_entities: entity_setting
                    .tied_entities
                    .into_iter()
                    .map(|tied| NewTiedEntity {
                        entity: tied.entity,
                        sync: tied.sync,
                    })
                    .collect(),
            })
            .collect();
        let entity_settings = repo
            .create_entity_settings(&integration, entity_settings)
            .await?;

        txn.commit().await?;

        counter!("integrations_created_total").increment(1);
        info!(integration_id = %integration.id, tenant_id = %tenant.id, "Registered integration");

        Ok(IntegrationTree {
            integration,
            settings: mask_settings(settings),
            entity_settings,
        })
    }

    pub async fn list(&self, ctx: &RequestContext) -> ServiceResult<Vec<IntegrationModel>> {
        ctx.require_permission(PermissionsEnum::IntegrationView)?;
        let tenant_id = ctx.tenant_id()?;
        Ok(TenantScopedRepository::<_, IntegrationTenant>::new(self.db, tenant_id)
            .find_all()
            .await?)
    }

    pub async fn get_tree(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<IntegrationTree> {
        let integration = self.find(ctx, id).await?;
        let repo = IntegrationRepository::new(self.db);

        Ok(IntegrationTree {
            settings: mask_settings(repo.settings(integration.id).await?),
            entity_settings: repo.entity_settings(integration.id).await?,
            integration,
        })
    }

    pub async fn list_settings(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
    ) -> ServiceResult<Vec<SettingModel>> {
        let integration = self.find(ctx, integration_id).await?;
        let settings = IntegrationRepository::new(self.db)
            .settings(integration.id)
            .await?;
        Ok(mask_settings(settings))
    }

    pub async fn list_entity_settings(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
    ) -> ServiceResult<EntitySettingTree> {
        let integration = self.find(ctx, integration_id).await?;
        Ok(IntegrationRepository::new(self.db)
            .entity_settings(integration.id)
            .await?)
    }

    /// Toggle `sync` on entity settings and their tied entities.
    #[instrument(skip(self, ctx, updates), fields(user_id = %ctx.user_id()))]
    pub async fn update_entity_settings(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
        updates: Vec<EntitySettingUpdate>,
    ) -> ServiceResult<EntitySettingTree> {
        ctx.require_permission(PermissionsEnum::IntegrationEdit)?;
        let integration = self.find(ctx, integration_id).await?;

        let txn = self.db.begin().await?;
        let repo = IntegrationRepository::new(&txn);
        for update in updates {
            repo.set_entity_sync(integration.id, update.id, update.sync)
                .await?;
            for tied in update.tied_entities {
                repo.set_tied_entity_sync(update.id, tied.id, tied.sync)
                    .await?;
            }
        }
        txn.commit().await?;

        Ok(IntegrationRepository::new(self.db)
            .entity_settings(integration.id)
            .await?)
    }

    /// Clear value of one setting.
    pub async fn setting_value(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
        setting_name: &str,
    ) -> ServiceResult<String> {
        let integration = self.find(ctx, integration_id).await?;
        let setting = IntegrationRepository::new(self.db)
            .find_setting(integration.id, setting_name)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Integration setting {setting_name} not found"))
            })?;

        open_setting_value(
            self.crypto_key,
            aad(&integration, setting_name),
            &setting.setting_value,
        )
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to open setting {setting_name}: {e}")))
    }

    pub async fn upsert_setting(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
        setting_name: &str,
        setting_value: &str,
    ) -> ServiceResult<SettingModel> {
        ctx.require_permission(PermissionsEnum::IntegrationEdit)?;
        self.write_setting(ctx, integration_id, setting_name, setting_value)
            .await
    }

    /// Store a setting on behalf of the integration itself, such as a rotated
    /// OAuth token. Needs read access only.
    pub(crate) async fn write_setting(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
        setting_name: &str,
        setting_value: &str,
    ) -> ServiceResult<SettingModel> {
        let integration = self.find(ctx, integration_id).await?;
        let value = self.store_value(&integration, setting_name, setting_value)?;

        let setting = IntegrationRepository::new(self.db)
            .upsert_setting(&integration, setting_name, value)
            .await?;
        Ok(mask_setting(setting))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<()> {
        ctx.require_permission(PermissionsEnum::IntegrationEdit)?;
        let tenant_id = ctx.tenant_id()?;
        TenantScopedRepository::<_, IntegrationTenant>::new(self.db, tenant_id)
            .soft_delete(id, "Integration")
            .await?;
        Ok(())
    }

    async fn find(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<IntegrationModel> {
        ctx.require_permission(PermissionsEnum::IntegrationView)?;
        let tenant_id = ctx.tenant_id()?;
        Ok(TenantScopedRepository::<_, IntegrationTenant>::new(self.db, tenant_id)
            .get(id, "Integration")
            .await?)
    }

    fn store_value(
        &self,
        integration: &IntegrationModel,
        setting_name: &str,
        value: &str,
    ) -> ServiceResult<String> {
        if !is_secret_setting(setting_name) {
            return Ok(value.to_string());
        }
        seal_setting_value(self.crypto_key, aad(integration, setting_name), value)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to seal setting {setting_name}: {e}")))
    }
}

fn aad<'s>(integration: &IntegrationModel, setting_name: &'s str) -> SettingAad<'s> {
    SettingAad {
        tenant_id: integration.tenant_id,
        integration_id: integration.id,
        setting_name,
    }
}

fn mask_setting(mut setting: SettingModel) -> SettingModel {
    if is_secret_setting(&setting.setting_name) {
        setting.setting_value = MASK.to_string();
    }
    setting
}

fn mask_settings(settings: Vec<SettingModel>) -> Vec<SettingModel> {
    settings.into_iter().map(mask_setting).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn setting(name: &str, value: &str) -> SettingModel {
        let now = Utc::now();
        SettingModel {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            integration_id: Uuid::new_v4(),
            setting_name: name.to_string(),
            setting_value: value.to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn only_secret_settings_are_masked() {
        assert_eq!(mask_setting(setting("client_id", "abc")).setting_value, "abc");
        assert_eq!(mask_setting(setting("access_token", "enc:xyz")).setting_value, MASK);
        assert_eq!(mask_setting(setting("refresh_token", "enc:xyz")).setting_value, MASK);
    }
}
