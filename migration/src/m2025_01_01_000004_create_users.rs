//! Migration to create users and their organization memberships.
//!
//! A freshly registered user has neither tenant nor role; both are attached
//! during tenant onboarding or invite acceptance.

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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid_pk(Users::Id))
                    .col(ColumnDef::new(Users::TenantId).uuid().null())
                    .col(ColumnDef::new(Users::RoleId).uuid().null())
                    .col(ColumnDef::new(Users::Email).text().not_null())
                    .col(ColumnDef::new(Users::FirstName).text().null())
                    .col(ColumnDef::new(Users::LastName).text().null())
                    .col(ColumnDef::new(Users::Hash).text().null())
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_tenant_id")
                            .from(Users::Table, Users::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserOrganizations::Table)
                    .if_not_exists()
                    .col(uuid_pk(UserOrganizations::Id))
                    .col(ColumnDef::new(UserOrganizations::TenantId).uuid().not_null())
                    .col(ColumnDef::new(UserOrganizations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserOrganizations::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserOrganizations::IsDefault)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserOrganizations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(created_at())
                    .col(updated_at())
                    .col(deleted_at())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organizations_user_id")
                            .from(UserOrganizations::Table, UserOrganizations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organizations_organization_id")
                            .from(UserOrganizations::Table, UserOrganizations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_organizations_user_org")
                    .table(UserOrganizations::Table)
                    .col(UserOrganizations::UserId)
                    .col(UserOrganizations::OrganizationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_organizations_user_org").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserOrganizations::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_users_email").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    TenantId,
    RoleId,
    Email,
    FirstName,
    LastName,
    Hash,
}

#[derive(DeriveIden)]
enum UserOrganizations {
    Table,
    Id,
    TenantId,
    UserId,
    OrganizationId,
    IsDefault,
    IsActive,
}
