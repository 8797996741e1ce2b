//! Generic tenant-scoped CRUD.
//!
//! Entities that carry `id`, `tenant_id` and `deleted_at` columns implement
//! [`TenantScoped`]; [`TenantScopedRepository`] then provides the read and
//! soft-delete operations every service needs without per-entity boilerplate.

use std::marker::PhantomData;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::error::RepositoryError;

/// An entity whose rows belong to a tenant and are soft-deleted.
pub trait TenantScoped: EntityTrait {
    fn id_column() -> Self::Column;
    fn tenant_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
}

macro_rules! tenant_scoped {
    ($($module:ident),+ $(,)?) => {
        $(
            impl TenantScoped for crate::models::$module::Entity {
                fn id_column() -> Self::Column {
                    crate::models::$module::Column::Id
                }
                fn tenant_column() -> Self::Column {
                    crate::models::$module::Column::TenantId
                }
                fn deleted_at_column() -> Self::Column {
                    crate::models::$module::Column::DeletedAt
                }
                fn created_at_column() -> Self::Column {
                    crate::models::$module::Column::CreatedAt
                }
            }
        )+
    };
}

tenant_scoped!(
    organization,
    role,
    role_permission,
    user_organization,
    organization_contact,
    organization_client,
    invite,
    integration_tenant,
    integration_setting,
    integration_entity_setting,
    integration_entity_setting_tied_entity,
);

/// Read and soft-delete access to one entity type within one tenant.
pub struct TenantScopedRepository<'a, C, E> {
    db: &'a C,
    tenant_id: Uuid,
    _entity: PhantomData<E>,
}

impl<'a, C, E> TenantScopedRepository<'a, C, E>
where
    C: ConnectionTrait,
    E: TenantScoped,
{
    pub fn new(db: &'a C, tenant_id: Uuid) -> Self {
        Self {
            db,
            tenant_id,
            _entity: PhantomData,
        }
    }

    /// Base query: live rows of this tenant, oldest first.
    pub fn query(&self) -> Select<E> {
        E::find()
            .filter(E::tenant_column().eq(self.tenant_id))
            .filter(E::deleted_at_column().is_null())
            .order_by_asc(E::created_at_column())
    }

    pub async fn find_all(&self) -> Result<Vec<E::Model>, RepositoryError> {
        self.query()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, RepositoryError> {
        self.query()
            .filter(E::id_column().eq(id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Like [`Self::find_by_id`] but a missing row is an error named after `what`.
    pub async fn get(&self, id: Uuid, what: &str) -> Result<E::Model, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(what))
    }

    pub async fn soft_delete(&self, id: Uuid, what: &str) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let result = E::update_many()
            .col_expr(
                E::deleted_at_column(),
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(E::id_column().eq(id))
            .filter(E::tenant_column().eq(self.tenant_id))
            .filter(E::deleted_at_column().is_null())
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(what));
        }
        Ok(())
    }
}
