//! Migration to create the integration configuration tree.
//!
//! integration_tenants
//!   ├── integration_settings
//!   └── integration_entity_settings
//!         └── integration_entity_setting_tied_entities

use sea_orm_migration::prelude::*;

use crate::columns::{created_at, deleted_at, updated_at, uuid_pk};
use crate::m2025_01_01_000001_create_tenants::Tenants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IntegrationTenants::Table)
                    .if_not_exists()
                    .col(uuid_pk(IntegrationTenants::Id))
                    .col(ColumnDef::new(IntegrationTenants::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(IntegrationTenants::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntegrationTenants::Name).text().not_null())
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integration_tenants_tenant_id")
                            .from(IntegrationTenants::Table, IntegrationTenants::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IntegrationSettings::Table)
                    .if_not_exists()
                    .col(uuid_pk(IntegrationSettings::Id))
                    .col(ColumnDef::new(IntegrationSettings::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(IntegrationSettings::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationSettings::IntegrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IntegrationSettings::SettingName).text().not_null())
                    .col(
                        ColumnDef::new(IntegrationSettings::SettingValue)
                            .text()
                            .not_null(),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integration_settings_integration_id")
                            .from(IntegrationSettings::Table, IntegrationSettings::IntegrationId)
                            .to(IntegrationTenants::Table, IntegrationTenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_integration_settings_integration_name")
                    .table(IntegrationSettings::Table)
                    .col(IntegrationSettings::IntegrationId)
                    .col(IntegrationSettings::SettingName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IntegrationEntitySettings::Table)
                    .if_not_exists()
                    .col(uuid_pk(IntegrationEntitySettings::Id))
                    .col(
                        ColumnDef::new(IntegrationEntitySettings::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettings::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettings::IntegrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettings::Entity)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettings::Sync)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_integration_entity_settings_integration_id")
                            .from(
                                IntegrationEntitySettings::Table,
                                IntegrationEntitySettings::IntegrationId,
                            )
                            .to(IntegrationTenants::Table, IntegrationTenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IntegrationEntitySettingTiedEntities::Table)
                    .if_not_exists()
                    .col(uuid_pk(IntegrationEntitySettingTiedEntities::Id))
                    .col(
                        ColumnDef::new(IntegrationEntitySettingTiedEntities::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettingTiedEntities::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(
                            IntegrationEntitySettingTiedEntities::IntegrationEntitySettingId,
                        )
                        .uuid()
                        .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettingTiedEntities::Entity)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEntitySettingTiedEntities::Sync)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tied_entities_entity_setting_id")
                            .from(
                                IntegrationEntitySettingTiedEntities::Table,
                                IntegrationEntitySettingTiedEntities::IntegrationEntitySettingId,
                            )
                            .to(
                                IntegrationEntitySettings::Table,
                                IntegrationEntitySettings::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(IntegrationEntitySettingTiedEntities::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(IntegrationEntitySettings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_integration_settings_integration_name")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(IntegrationSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IntegrationTenants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IntegrationTenants {
    Table,
    Id,
    TenantId,
    OrganizationId,
    Name,
}

#[derive(DeriveIden)]
enum IntegrationSettings {
    Table,
    Id,
    TenantId,
    OrganizationId,
    IntegrationId,
    SettingName,
    SettingValue,
}

#[derive(DeriveIden)]
enum IntegrationEntitySettings {
    Table,
    Id,
    TenantId,
    OrganizationId,
    IntegrationId,
    Entity,
    Sync,
}

#[derive(DeriveIden)]
enum IntegrationEntitySettingTiedEntities {
    Table,
    Id,
    TenantId,
    OrganizationId,
    IntegrationEntitySettingId,
    Entity,
    Sync,
}
