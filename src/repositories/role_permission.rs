//! # Role Permission Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::role::Model as RoleModel;
use crate::models::role_permission::{
    ActiveModel as RolePermissionActiveModel, Column as RolePermissionColumn,
    Entity as RolePermission, Model as RolePermissionModel,
};
use crate::models::Role;

/// A permission row to be inserted.
#[derive(Debug, Clone)]
pub struct NewRolePermission {
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    pub permission: String,
    pub enabled: bool,
    pub description: Option<String>,
}

/// Optional filters for listing permissions within a tenant.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RolePermissionFilter {
    pub role_id: Option<Uuid>,
    pub enabled: Option<bool>,
}

pub struct RolePermissionRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RolePermissionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create_many(
        &self,
        rows: Vec<NewRolePermission>,
    ) -> Result<Vec<RolePermissionModel>, RepositoryError> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(rows.len());

        for row in rows {
            let model = RolePermissionActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(row.tenant_id),
                role_id: Set(row.role_id),
                permission: Set(row.permission),
                enabled: Set(row.enabled),
                description: Set(row.description),
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

    pub async fn find_for_role(
        &self,
        role_id: Uuid,
    ) -> Result<Vec<RolePermissionModel>, RepositoryError> {
        RolePermission::find()
            .filter(RolePermissionColumn::RoleId.eq(role_id))
            .filter(RolePermissionColumn::DeletedAt.is_null())
            .order_by_asc(RolePermissionColumn::Permission)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &RolePermissionFilter,
    ) -> Result<Vec<RolePermissionModel>, RepositoryError> {
        let mut query = RolePermission::find()
            .filter(RolePermissionColumn::TenantId.eq(tenant_id))
            .filter(RolePermissionColumn::DeletedAt.is_null());

        if let Some(role_id) = filter.role_id {
            query = query.filter(RolePermissionColumn::RoleId.eq(role_id));
        }
        if let Some(enabled) = filter.enabled {
            query = query.filter(RolePermissionColumn::Enabled.eq(enabled));
        }

        query
            .order_by_asc(RolePermissionColumn::Permission)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// A tenant's permission row together with the role it grants to.
    pub async fn find_with_role(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<(RolePermissionModel, RoleModel)>, RepositoryError> {
        let found = RolePermission::find_by_id(id)
            .filter(RolePermissionColumn::TenantId.eq(tenant_id))
            .filter(RolePermissionColumn::DeletedAt.is_null())
            .find_also_related(Role)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.and_then(|(permission, role)| role.map(|role| (permission, role))))
    }

    pub async fn update(
        &self,
        existing: RolePermissionModel,
        enabled: Option<bool>,
        description: Option<String>,
    ) -> Result<RolePermissionModel, RepositoryError> {
        let mut active = existing.into_active_model();
        if let Some(enabled) = enabled {
            active.enabled = Set(enabled);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
