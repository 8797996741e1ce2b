//! # Tenants API Handlers
//!
//! Tenant onboarding for a freshly registered user.

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::context::RequestContext;
use crate::error::{ApiError, validation_error};
use crate::handlers::types::TenantResponse;
use crate::server::AppState;
use crate::services::tenant::{self, CreateTenantInput};

/// Create the caller's tenant
///
/// Creates every built-in role with its default permissions and makes the
/// caller the tenant's `SUPER_ADMIN`.
#[utoipa::path(
    post,
    path = "/api/tenant",
    security(("bearer_auth" = [])),
    request_body = CreateTenantInput,
    responses(
        (status = 201, description = "Tenant created", body = TenantResponse, headers(
            ("Location", description = "URL of the created tenant")
        )),
        (status = 400, description = "Caller already belongs to a tenant", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateTenantInput>,
) -> Result<(StatusCode, [(&'static str, String); 1], Json<TenantResponse>), ApiError> {
    if input.name.trim().is_empty() {
        return Err(validation_error(
            "Tenant name is required and cannot be empty",
            json!({ "field": "name" }),
        ));
    }

    let tenant = tenant::onboard_tenant(&state.db, &ctx, input).await?;

    Ok((
        StatusCode::CREATED,
        [("Location", "/api/tenant".to_string())],
        Json(tenant.into()),
    ))
}

/// The caller's tenant
#[utoipa::path(
    get,
    path = "/api/tenant",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tenant retrieved", body = TenantResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller has no tenant", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant = tenant::current_tenant(&state.db, &ctx).await?;
    Ok(Json(tenant.into()))
}
