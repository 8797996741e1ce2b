//! Migration to create organization contacts and organization clients.
//!
//! Both are external counterparties of an organization that can be invited
//! to run their own tenant. Once they accept, `contact_organization_id` /
//! `client_organization_id` points at the organization created for them.

use sea_orm_migration::prelude::*;

use crate::columns::{created_at, deleted_at, updated_at, uuid_pk};
use crate::m2025_01_01_000001_create_tenants::Tenants;
use crate::m2025_01_01_000002_create_organizations::Organizations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganizationContacts::Table)
                    .if_not_exists()
                    .col(uuid_pk(OrganizationContacts::Id))
                    .col(ColumnDef::new(OrganizationContacts::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(OrganizationContacts::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationContacts::Name).text().not_null())
                    .col(ColumnDef::new(OrganizationContacts::PrimaryEmail).text().null())
                    .col(ColumnDef::new(OrganizationContacts::InviteStatus).text().null())
                    .col(
                        ColumnDef::new(OrganizationContacts::ContactOrganizationId)
                            .uuid()
                            .null(),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_contacts_tenant_id")
                            .from(OrganizationContacts::Table, OrganizationContacts::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_contacts_organization_id")
                            .from(
                                OrganizationContacts::Table,
                                OrganizationContacts::OrganizationId,
                            )
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationClients::Table)
                    .if_not_exists()
                    .col(uuid_pk(OrganizationClients::Id))
                    .col(ColumnDef::new(OrganizationClients::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(OrganizationClients::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationClients::Name).text().not_null())
                    .col(ColumnDef::new(OrganizationClients::PrimaryEmail).text().null())
                    .col(ColumnDef::new(OrganizationClients::InviteStatus).text().null())
                    .col(
                        ColumnDef::new(OrganizationClients::ClientOrganizationId)
                            .uuid()
                            .null(),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_clients_tenant_id")
                            .from(OrganizationClients::Table, OrganizationClients::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_clients_organization_id")
                            .from(
                                OrganizationClients::Table,
                                OrganizationClients::OrganizationId,
                            )
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrganizationClients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationContacts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum OrganizationContacts {
    Table,
    Id,
    TenantId,
    OrganizationId,
    Name,
    PrimaryEmail,
    InviteStatus,
    ContactOrganizationId,
}

#[derive(DeriveIden)]
pub(crate) enum OrganizationClients {
    Table,
    Id,
    TenantId,
    OrganizationId,
    Name,
    PrimaryEmail,
    InviteStatus,
    ClientOrganizationId,
}
