//! # Tenant Repository
//!
//! Create and look up tenants. Tenants are not themselves tenant-scoped, so
//! they do not go through [`super::crud::TenantScopedRepository`].

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column as TenantColumn, Entity as Tenant,
    Model as TenantModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Repository for Tenant database operations
pub struct TenantRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a new tenant
    pub async fn create_tenant(&self, name: &str) -> Result<TenantModel, RepositoryError> {
        let name = validate_tenant_name(name)?;
        let now = Utc::now();

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a live tenant by ID
    pub async fn get_tenant_by_id(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find_by_id(tenant_id)
            .filter(TenantColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all live tenants, oldest first
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Tenant::find()
            .filter(TenantColumn::DeletedAt.is_null())
            .order_by_asc(TenantColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

/// Tenant names are also used as display names of onboarded workspaces.
fn validate_tenant_name(name: &str) -> Result<&str, RepositoryError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(RepositoryError::validation_error(
            "Tenant name cannot be empty",
        ));
    }

    if name.chars().count() > 255 {
        return Err(RepositoryError::validation_error(
            "Tenant name cannot exceed 255 characters",
        ));
    }

    if name.chars().any(char::is_control) {
        return Err(RepositoryError::validation_error(
            "Tenant name cannot contain control characters",
        ));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_name_is_trimmed() {
        assert_eq!(validate_tenant_name("  Acme Inc.  ").unwrap(), "Acme Inc.");
    }

    #[test]
    fn tenant_name_rules() {
        assert!(validate_tenant_name("   ").is_err());
        assert!(validate_tenant_name(&"a".repeat(256)).is_err());
        assert!(validate_tenant_name("bad\nname").is_err());
        assert!(validate_tenant_name(&"a".repeat(255)).is_ok());
    }
}
