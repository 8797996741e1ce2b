//! # Roles API Handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::query::DataQuery;
use crate::handlers::types::{ListResponse, RolePermissionResponse, RoleResponse};
use crate::repositories::role_permission::RolePermissionFilter;
use crate::server::AppState;
use crate::services::role_permissions::{self, UpdateRolePermissionInput};

#[utoipa::path(
    get,
    path = "/api/roles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Roles of the caller's tenant", body = ListResponse<RoleResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller has no tenant", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ListResponse<RoleResponse>>, ApiError> {
    let roles = role_permissions::list_roles(&state.db, &ctx).await?;
    Ok(Json(ListResponse::from_models(roles)))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}/permissions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role UUID")),
    responses(
        (status = 200, description = "Permissions of the role", body = ListResponse<RolePermissionResponse>),
        (status = 404, description = "Role not found", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn role_permissions(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(role_id): Path<Uuid>,
) -> Result<Json<ListResponse<RolePermissionResponse>>, ApiError> {
    let permissions = role_permissions::find_for_role(&state.db, &ctx, role_id).await?;
    Ok(Json(ListResponse::from_models(permissions)))
}

/// List permission rows
///
/// Filter with `data={"role_id": "...", "enabled": true}`.
#[utoipa::path(
    get,
    path = "/api/role-permissions",
    security(("bearer_auth" = [])),
    params(("data" = Option<String>, Query, description = "JSON encoded RolePermissionFilter")),
    responses(
        (status = 200, description = "Permission rows", body = ListResponse<RolePermissionResponse>),
        (status = 400, description = "Malformed data parameter", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn list_role_permissions(
    State(state): State<AppState>,
    ctx: RequestContext,
    DataQuery(filter): DataQuery<RolePermissionFilter>,
) -> Result<Json<ListResponse<RolePermissionResponse>>, ApiError> {
    let permissions = role_permissions::list(&state.db, &ctx, &filter).await?;
    Ok(Json(ListResponse::from_models(permissions)))
}

#[utoipa::path(
    put,
    path = "/api/role-permissions/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role permission UUID")),
    request_body = UpdateRolePermissionInput,
    responses(
        (status = 200, description = "Permission updated", body = RolePermissionResponse),
        (status = 400, description = "SUPER_ADMIN permissions are fixed", body = ApiError),
        (status = 403, description = "Missing CHANGE_ROLES_PERMISSIONS", body = ApiError),
        (status = 404, description = "Permission not found", body = ApiError)
    ),
    tag = "roles"
)]
pub async fn update_role_permission(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateRolePermissionInput>,
) -> Result<Json<RolePermissionResponse>, ApiError> {
    let permission = role_permissions::update_permission(&state.db, &ctx, id, input).await?;
    Ok(Json(permission.into()))
}
