//! The explicit per-request caller.
//!
//! Handlers extract a [`RequestContext`] and hand it to services by reference;
//! services never look up "the current user" on their own. Guards are plain
//! method calls on the context.

use std::collections::HashSet;

use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ServiceError, ServiceResult, unauthorized};
use crate::models::enums::RolesEnum;
use crate::models::role::Model as RoleModel;
use crate::models::user::Model as UserModel;
use crate::permissions::PermissionsEnum;
use crate::repositories::{RolePermissionRepository, RoleRepository, UserRepository};
use crate::server::AppState;

/// Authenticated user with their role and enabled permissions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: UserModel,
    pub role: Option<RoleModel>,
    pub permissions: HashSet<PermissionsEnum>,
}

impl RequestContext {
    /// Load the caller's user row, role and enabled permissions.
    pub async fn load<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ServiceResult<Self> {
        let user = UserRepository::new(db)
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Unknown user".to_string()))?;

        let role = match user.role_id {
            Some(role_id) => RoleRepository::new(db).find_by_id(role_id).await?,
            None => None,
        };

        let permissions = match &role {
            Some(role) => RolePermissionRepository::new(db)
                .find_for_role(role.id)
                .await?
                .into_iter()
                .filter(|row| row.enabled)
                .filter_map(|row| PermissionsEnum::parse(&row.permission))
                .collect(),
            None => HashSet::new(),
        };

        Ok(Self {
            user,
            role,
            permissions,
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Tenant of the caller. Users that have not onboarded yet have none.
    pub fn tenant_id(&self) -> ServiceResult<Uuid> {
        self.user
            .tenant_id
            .ok_or_else(|| ServiceError::Forbidden("User does not belong to a tenant".to_string()))
    }

    pub fn role_name(&self) -> Option<RolesEnum> {
        self.role.as_ref().map(|role| role.name)
    }

    pub fn has_role(&self, role: RolesEnum) -> bool {
        self.role_name() == Some(role)
    }

    pub fn has_permission(&self, permission: PermissionsEnum) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require_permission(&self, permission: PermissionsEnum) -> ServiceResult<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "Missing permission {permission}"
            )))
        }
    }

    /// Passes when the caller holds any of `roles`.
    pub fn require_role(&self, roles: &[RolesEnum]) -> ServiceResult<()> {
        match self.role_name() {
            Some(name) if roles.contains(&name) => Ok(()),
            _ => Err(ServiceError::Forbidden(
                "Role is not allowed to perform this action".to_string(),
            )),
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user_id) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| unauthorized(Some("Authentication required")))?;

        Ok(RequestContext::load(&state.db, user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn context(role: Option<RolesEnum>, permissions: &[PermissionsEnum]) -> RequestContext {
        let now = Utc::now();
        let tenant_id = Uuid::new_v4();
        let role = role.map(|name| RoleModel {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        });
        RequestContext {
            user: UserModel {
                id: Uuid::new_v4(),
                tenant_id: role.as_ref().map(|_| tenant_id),
                role_id: role.as_ref().map(|r| r.id),
                email: "ops@acme.test".to_string(),
                first_name: None,
                last_name: None,
                hash: None,
                created_at: now.into(),
                updated_at: now.into(),
                deleted_at: None,
            },
            role,
            permissions: permissions.iter().copied().collect(),
        }
    }

    #[test]
    fn permission_guard() {
        let ctx = context(Some(RolesEnum::Admin), &[PermissionsEnum::OrgInviteEdit]);
        assert!(ctx.require_permission(PermissionsEnum::OrgInviteEdit).is_ok());
        assert!(matches!(
            ctx.require_permission(PermissionsEnum::ChangeRolesPermissions),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn role_guard() {
        let ctx = context(Some(RolesEnum::Manager), &[]);
        assert!(ctx.require_role(&[RolesEnum::Admin, RolesEnum::Manager]).is_ok());
        assert!(ctx.require_role(&[RolesEnum::SuperAdmin]).is_err());
    }

    #[test]
    fn user_without_tenant_is_forbidden() {
        let ctx = context(None, &[]);
        assert!(ctx.tenant_id().is_err());
        assert!(ctx.require_role(&[RolesEnum::Viewer]).is_err());
    }
}
