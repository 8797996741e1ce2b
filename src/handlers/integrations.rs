//! # Integrations API Handlers
//!
//! The per-tenant integration tree: integration, settings, entity settings and
//! their tied entities. Secret setting values are never returned in clear.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::types::{
    EntitySettingResponse, IntegrationResponse, IntegrationSettingResponse,
    IntegrationTreeResponse, ListResponse,
};
use crate::server::AppState;
use crate::services::integration::{
    AddIntegrationInput, EntitySettingUpdate, IntegrationService, SettingInput,
};

fn service(state: &AppState) -> IntegrationService<'_> {
    IntegrationService::new(&state.db, &state.crypto_key)
}

/// Register an integration with its settings and entity settings
#[utoipa::path(
    post,
    path = "/api/integration-tenant",
    security(("bearer_auth" = [])),
    request_body = AddIntegrationInput,
    responses(
        (status = 201, description = "Integration created", body = IntegrationTreeResponse),
        (status = 403, description = "Missing INTEGRATION_EDIT", body = ApiError),
        (status = 404, description = "Tenant or organization not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn add_integration(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<AddIntegrationInput>,
) -> Result<(StatusCode, Json<IntegrationTreeResponse>), ApiError> {
    let tree = service(&state).add_integration(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(tree.into())))
}

#[utoipa::path(
    get,
    path = "/api/integration-tenant",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Integrations of the caller's tenant", body = ListResponse<IntegrationResponse>),
        (status = 403, description = "Missing INTEGRATION_VIEW", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn list_integrations(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ListResponse<IntegrationResponse>>, ApiError> {
    let integrations = service(&state).list(&ctx).await?;
    Ok(Json(ListResponse::from_models(integrations)))
}

#[utoipa::path(
    get,
    path = "/api/integration-tenant/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    responses(
        (status = 200, description = "Integration tree", body = IntegrationTreeResponse),
        (status = 404, description = "Integration not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn get_integration(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<IntegrationTreeResponse>, ApiError> {
    let tree = service(&state).get_tree(&ctx, id).await?;
    Ok(Json(tree.into()))
}

#[utoipa::path(
    delete,
    path = "/api/integration-tenant/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    responses(
        (status = 204, description = "Integration removed"),
        (status = 404, description = "Integration not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn delete_integration(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state).delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/integration-tenant/{id}/settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    responses(
        (status = 200, description = "Settings with secrets masked", body = ListResponse<IntegrationSettingResponse>),
        (status = 404, description = "Integration not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn list_settings(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<IntegrationSettingResponse>>, ApiError> {
    let settings = service(&state).list_settings(&ctx, id).await?;
    Ok(Json(ListResponse::from_models(settings)))
}

/// Create or replace one setting
#[utoipa::path(
    put,
    path = "/api/integration-tenant/{id}/settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    request_body = SettingInput,
    responses(
        (status = 200, description = "Setting stored", body = IntegrationSettingResponse),
        (status = 404, description = "Integration not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn upsert_setting(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(input): Json<SettingInput>,
) -> Result<Json<IntegrationSettingResponse>, ApiError> {
    let setting = service(&state)
        .upsert_setting(&ctx, id, &input.setting_name, &input.setting_value)
        .await?;
    Ok(Json(setting.into()))
}

#[utoipa::path(
    get,
    path = "/api/integration-tenant/{id}/entity-settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    responses(
        (status = 200, description = "Entity settings with tied entities", body = ListResponse<EntitySettingResponse>),
        (status = 404, description = "Integration not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn list_entity_settings(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponse<EntitySettingResponse>>, ApiError> {
    let tree = service(&state).list_entity_settings(&ctx, id).await?;
    Ok(Json(ListResponse::from_models(tree)))
}

/// Toggle sync on entity settings and their tied entities
#[utoipa::path(
    put,
    path = "/api/integration-tenant/{id}/entity-settings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Integration UUID")),
    request_body = Vec<EntitySettingUpdate>,
    responses(
        (status = 200, description = "Updated entity settings", body = ListResponse<EntitySettingResponse>),
        (status = 403, description = "Missing INTEGRATION_EDIT", body = ApiError),
        (status = 404, description = "Integration or entity setting not found", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn update_entity_settings(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(updates): Json<Vec<EntitySettingUpdate>>,
) -> Result<Json<ListResponse<EntitySettingResponse>>, ApiError> {
    let tree = service(&state)
        .update_entity_settings(&ctx, id, updates)
        .await?;
    Ok(Json(ListResponse::from_models(tree)))
}
