//! # Integration Repository
//!
//! Persistence for the integration tree:
//! `IntegrationTenant → {IntegrationSetting, IntegrationEntitySetting → TiedEntity}`.
//! Every child row is stamped with the parent's tenant and organization.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::enums::IntegrationEntity;
use crate::models::integration_entity_setting::{
    ActiveModel as EntitySettingActiveModel, Column as EntitySettingColumn,
    Entity as EntitySetting, Model as EntitySettingModel,
};
use crate::models::integration_entity_setting_tied_entity::{
    ActiveModel as TiedEntityActiveModel, Column as TiedEntityColumn, Entity as TiedEntity,
    Model as TiedEntityModel,
};
use crate::models::integration_setting::{
    ActiveModel as SettingActiveModel, Column as SettingColumn, Entity as Setting,
    Model as SettingModel,
};
use crate::models::integration_tenant::{
    ActiveModel as IntegrationActiveModel, Model as IntegrationModel,
};

/// An entity setting together with the entities synchronized under it.
#[derive(Debug, Clone)]
pub struct NewEntitySetting {
    pub entity: IntegrationEntity,
    pub sync: bool,
    pub tied_entities: Vec<NewTiedEntity>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewTiedEntity {
    pub entity: IntegrationEntity,
    pub sync: bool,
}

pub type EntitySettingTree = Vec<(EntitySettingModel, Vec<TiedEntityModel>)>;

pub struct IntegrationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> IntegrationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create_integration(
        &self,
        tenant_id: Uuid,
        organization_id: Uuid,
        name: &str,
    ) -> Result<IntegrationModel, RepositoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::validation_error(
                "Integration name cannot be empty",
            ));
        }

        let now = Utc::now();
        IntegrationActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            organization_id: Set(organization_id),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Insert settings under `integration`. Values are stored as given.
    pub async fn create_settings(
        &self,
        integration: &IntegrationModel,
        settings: Vec<(String, String)>,
    ) -> Result<Vec<SettingModel>, RepositoryError> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(settings.len());

        for (setting_name, setting_value) in settings {
            let model = SettingActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(integration.tenant_id),
                organization_id: Set(integration.organization_id),
                integration_id: Set(integration.id),
                setting_name: Set(setting_name),
                setting_value: Set(setting_value),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                deleted_at: Set(None),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
            created.push(model);
        }

        Ok(created)
    }

    pub async fn create_entity_settings(
        &self,
        integration: &IntegrationModel,
        entity_settings: Vec<NewEntitySetting>,
    ) -> Result<EntitySettingTree, RepositoryError> {
        let now = Utc::now();
        let mut tree = Vec::with_capacity(entity_settings.len());

        for entity_setting in entity_settings {
            let parent = EntitySettingActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(integration.tenant_id),
                organization_id: Set(integration.organization_id),
                integration_id: Set(integration.id),
                entity: Set(entity_setting.entity),
                sync: Set(entity_setting.sync),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                deleted_at: Set(None),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

            let mut tied = Vec::with_capacity(entity_setting.tied_entities.len());
            for tied_entity in entity_setting.tied_entities {
                let model = TiedEntityActiveModel {
                    id: Set(Uuid::new_v4()),
                    tenant_id: Set(integration.tenant_id),
                    organization_id: Set(integration.organization_id),
                    integration_entity_setting_id: Set(parent.id),
                    entity: Set(tied_entity.entity),
                    sync: Set(tied_entity.sync),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    deleted_at: Set(None),
                }
                .insert(self.db)
                .await
                .map_err(RepositoryError::database_error)?;
                tied.push(model);
            }

            tree.push((parent, tied));
        }

        Ok(tree)
    }

    pub async fn settings(&self, integration_id: Uuid) -> Result<Vec<SettingModel>, RepositoryError> {
        Setting::find()
            .filter(SettingColumn::IntegrationId.eq(integration_id))
            .filter(SettingColumn::DeletedAt.is_null())
            .order_by_asc(SettingColumn::SettingName)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_setting(
        &self,
        integration_id: Uuid,
        setting_name: &str,
    ) -> Result<Option<SettingModel>, RepositoryError> {
        Setting::find()
            .filter(SettingColumn::IntegrationId.eq(integration_id))
            .filter(SettingColumn::SettingName.eq(setting_name))
            .filter(SettingColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replace the value of a named setting, creating it when missing.
    pub async fn upsert_setting(
        &self,
        integration: &IntegrationModel,
        setting_name: &str,
        setting_value: String,
    ) -> Result<SettingModel, RepositoryError> {
        match self.find_setting(integration.id, setting_name).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.setting_value = Set(setting_value);
                active.updated_at = Set(Utc::now().into());
                active
                    .update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => {
                let mut created = self
                    .create_settings(integration, vec![(setting_name.to_string(), setting_value)])
                    .await?;
                created
                    .pop()
                    .ok_or_else(|| RepositoryError::not_found("Integration setting"))
            }
        }
    }

    /// Entity settings of an integration, each with its tied entities.
    pub async fn entity_settings(
        &self,
        integration_id: Uuid,
    ) -> Result<EntitySettingTree, RepositoryError> {
        let rows = EntitySetting::find()
            .filter(EntitySettingColumn::IntegrationId.eq(integration_id))
            .filter(EntitySettingColumn::DeletedAt.is_null())
            .order_by_asc(EntitySettingColumn::CreatedAt)
            .find_with_related(TiedEntity)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows
            .into_iter()
            .map(|(parent, tied)| {
                let tied = tied
                    .into_iter()
                    .filter(|row| row.deleted_at.is_none())
                    .collect();
                (parent, tied)
            })
            .collect())
    }

    /// Set `sync` on one entity setting of the integration.
    pub async fn set_entity_sync(
        &self,
        integration_id: Uuid,
        entity_setting_id: Uuid,
        sync: bool,
    ) -> Result<EntitySettingModel, RepositoryError> {
        let existing = EntitySetting::find_by_id(entity_setting_id)
            .filter(EntitySettingColumn::IntegrationId.eq(integration_id))
            .filter(EntitySettingColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Integration entity setting"))?;

        let mut active = existing.into_active_model();
        active.sync = Set(sync);
        active.updated_at = Set(Utc::now().into());
        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Set `sync` on a tied entity belonging to the given entity setting.
    pub async fn set_tied_entity_sync(
        &self,
        entity_setting_id: Uuid,
        tied_entity_id: Uuid,
        sync: bool,
    ) -> Result<TiedEntityModel, RepositoryError> {
        let existing = TiedEntity::find_by_id(tied_entity_id)
            .filter(TiedEntityColumn::IntegrationEntitySettingId.eq(entity_setting_id))
            .filter(TiedEntityColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Integration tied entity"))?;

        let mut active = existing.into_active_model();
        active.sync = Set(sync);
        active.updated_at = Set(Utc::now().into());
        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
