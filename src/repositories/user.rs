//! # User Repository
//!
//! Users plus their organization memberships.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};
use crate::models::user_organization::{
    ActiveModel as UserOrganizationActiveModel, Model as UserOrganizationModel,
};

/// Data for a user row. `hash` must already be a password hash.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hash: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
}

pub struct UserRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, user: NewUser) -> Result<UserModel, RepositoryError> {
        let now = Utc::now();

        UserActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(user.tenant_id),
            role_id: Set(user.role_id),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            hash: Set(user.hash),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(user_id)
            .filter(UserColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(UserColumn::Email.eq(email))
            .filter(UserColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Attach a tenant and role to an existing user.
    pub async fn assign_tenant(
        &self,
        user: UserModel,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> Result<UserModel, RepositoryError> {
        let mut active = user.into_active_model();
        active.tenant_id = Set(Some(tenant_id));
        active.role_id = Set(Some(role_id));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Place the user under an organization.
    pub async fn add_to_organization(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        organization_id: Uuid,
    ) -> Result<UserOrganizationModel, RepositoryError> {
        let now = Utc::now();

        UserOrganizationActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            user_id: Set(user_id),
            organization_id: Set(organization_id),
            is_default: Set(true),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }
}
