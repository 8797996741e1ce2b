//! # Role Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::enums::RolesEnum;
use crate::models::role::{
    ActiveModel as RoleActiveModel, Column as RoleColumn, Entity as Role, Model as RoleModel,
};

pub struct RoleRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RoleRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create_role(
        &self,
        tenant_id: Uuid,
        name: RolesEnum,
    ) -> Result<RoleModel, RepositoryError> {
        let now = Utc::now();

        RoleActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Create one role per name for the tenant, in the given order.
    pub async fn create_roles(
        &self,
        tenant_id: Uuid,
        names: &[RolesEnum],
    ) -> Result<Vec<RoleModel>, RepositoryError> {
        let mut roles = Vec::with_capacity(names.len());
        for name in names {
            roles.push(self.create_role(tenant_id, *name).await?);
        }
        Ok(roles)
    }

    pub async fn find_by_id(&self, role_id: Uuid) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find_by_id(role_id)
            .filter(RoleColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_name(
        &self,
        tenant_id: Uuid,
        name: RolesEnum,
    ) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find()
            .filter(RoleColumn::TenantId.eq(tenant_id))
            .filter(RoleColumn::Name.eq(name))
            .filter(RoleColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All live roles belonging to any of the given tenants.
    pub async fn find_for_tenants(
        &self,
        tenant_ids: &[Uuid],
    ) -> Result<Vec<RoleModel>, RepositoryError> {
        if tenant_ids.is_empty() {
            return Ok(Vec::new());
        }

        Role::find()
            .filter(RoleColumn::TenantId.is_in(tenant_ids.iter().copied()))
            .filter(RoleColumn::DeletedAt.is_null())
            .order_by_asc(RoleColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
