//! Migration to create the organizations table.
//!
//! Organizations live under a tenant and carry the invite policy
//! (`invites_allowed`, `invite_expiry_period` in days).

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
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(uuid_pk(Organizations::Id))
                    .col(ColumnDef::new(Organizations::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Organizations::Name).text().not_null())
                    .col(
                        ColumnDef::new(Organizations::Currency)
                            .text()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Organizations::InvitesAllowed)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Organizations::InviteExpiryPeriod)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organizations_tenant_id")
                            .from(Organizations::Table, Organizations::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_tenant_id")
                    .table(Organizations::Table)
                    .col(Organizations::TenantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_organizations_tenant_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Organizations {
    Table,
    Id,
    TenantId,
    Name,
    Currency,
    InvitesAllowed,
    InviteExpiryPeriod,
    IsActive,
}
