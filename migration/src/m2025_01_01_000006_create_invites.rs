//! Migration to create invites and their link tables.
//!
//! An invite may target projects, departments and organization contacts;
//! those associations live in plain `(invite_id, target_id)` link tables.

use sea_orm_migration::prelude::*;

use crate::columns::{created_at, deleted_at, updated_at, uuid_pk};
use crate::m2025_01_01_000001_create_tenants::Tenants;
use crate::m2025_01_01_000002_create_organizations::Organizations;
use crate::m2025_01_01_000003_create_roles_and_permissions::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(uuid_pk(Invites::Id))
                    .col(ColumnDef::new(Invites::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Invites::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Invites::Email).text().not_null())
                    .col(ColumnDef::new(Invites::Token).text().not_null())
                    .col(ColumnDef::new(Invites::RoleId).uuid().not_null())
                    .col(ColumnDef::new(Invites::InvitedById).uuid().not_null())
                    .col(
                        ColumnDef::new(Invites::Status)
                            .text()
                            .not_null()
                            .default("INVITED"),
                    )
                    .col(
                        ColumnDef::new(Invites::InvitationType)
                            .text()
                            .not_null()
                            .default("USER"),
                    )
                    .col(
                        ColumnDef::new(Invites::ExpireDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invites::ActionDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::OrganizationContactId).uuid().null())
                    .col(ColumnDef::new(Invites::OrganizationClientId).uuid().null())
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invites_tenant_id")
                            .from(Invites::Table, Invites::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invites_organization_id")
                            .from(Invites::Table, Invites::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invites_role_id")
                            .from(Invites::Table, Invites::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Pending-invite lookups filter on organization, email and status
        manager
            .create_index(
                Index::create()
                    .name("idx_invites_org_email_status")
                    .table(Invites::Table)
                    .col(Invites::OrganizationId)
                    .col(Invites::Email)
                    .col(Invites::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InviteProjects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InviteProjects::InviteId).uuid().not_null())
                    .col(ColumnDef::new(InviteProjects::ProjectId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(InviteProjects::InviteId)
                            .col(InviteProjects::ProjectId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_projects_invite_id")
                            .from(InviteProjects::Table, InviteProjects::InviteId)
                            .to(Invites::Table, Invites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InviteDepartments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InviteDepartments::InviteId).uuid().not_null())
                    .col(
                        ColumnDef::new(InviteDepartments::DepartmentId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(InviteDepartments::InviteId)
                            .col(InviteDepartments::DepartmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_departments_invite_id")
                            .from(InviteDepartments::Table, InviteDepartments::InviteId)
                            .to(Invites::Table, Invites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InviteOrganizationContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InviteOrganizationContacts::InviteId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InviteOrganizationContacts::OrganizationContactId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(InviteOrganizationContacts::InviteId)
                            .col(InviteOrganizationContacts::OrganizationContactId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_organization_contacts_invite_id")
                            .from(
                                InviteOrganizationContacts::Table,
                                InviteOrganizationContacts::InviteId,
                            )
                            .to(Invites::Table, Invites::Id)
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
                    .table(InviteOrganizationContacts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(InviteDepartments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InviteProjects::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_invites_org_email_status").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Invites {
    Table,
    Id,
    TenantId,
    OrganizationId,
    Email,
    Token,
    RoleId,
    InvitedById,
    Status,
    InvitationType,
    ExpireDate,
    ActionDate,
    OrganizationContactId,
    OrganizationClientId,
}

#[derive(DeriveIden)]
enum InviteProjects {
    Table,
    InviteId,
    ProjectId,
}

#[derive(DeriveIden)]
enum InviteDepartments {
    Table,
    InviteId,
    DepartmentId,
}

#[derive(DeriveIden)]
enum InviteOrganizationContacts {
    Table,
    InviteId,
    OrganizationContactId,
}
