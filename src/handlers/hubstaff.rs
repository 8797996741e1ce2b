//! # Hubstaff API Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::types::{IntegrationTreeResponse, ListResponse};
use crate::integrations::hubstaff::{HubstaffOrganization, HubstaffProject};
use crate::permissions::PermissionsEnum;
use crate::server::AppState;
use crate::services::hubstaff::{ConnectHubstaffInput, HubstaffService};

fn service(state: &AppState) -> HubstaffService<'_> {
    HubstaffService::new(&state.db, &state.crypto_key, &state.hubstaff)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorizeUrlQuery {
    pub client_id: String,
    pub redirect_uri: String,
}

/// Response payload for the Hubstaff consent URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeUrlResponse {
    #[schema(example = "https://account.hubstaff.com/authorizations/new?response_type=code&client_id=abc")]
    pub authorize_url: String,
    /// Value the OAuth callback must echo back
    pub state: String,
}

/// Hubstaff consent URL for the given OAuth app
#[utoipa::path(
    get,
    path = "/api/integrations/hubstaff/authorize-url",
    security(("bearer_auth" = [])),
    params(AuthorizeUrlQuery),
    responses(
        (status = 200, description = "Consent URL", body = AuthorizeUrlResponse),
        (status = 403, description = "Missing INTEGRATION_EDIT", body = ApiError)
    ),
    tag = "hubstaff"
)]
pub async fn authorize_url(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<AuthorizeUrlQuery>,
) -> Result<Json<AuthorizeUrlResponse>, ApiError> {
    ctx.require_permission(PermissionsEnum::IntegrationEdit)?;

    let (url, oauth_state) = service(&state).authorize_url(&query.client_id, &query.redirect_uri)?;
    Ok(Json(AuthorizeUrlResponse {
        authorize_url: url.to_string(),
        state: oauth_state,
    }))
}

/// Exchange an authorization code and register the Hubstaff integration
#[utoipa::path(
    post,
    path = "/api/integrations/hubstaff/token",
    security(("bearer_auth" = [])),
    request_body = ConnectHubstaffInput,
    responses(
        (status = 201, description = "Integration created", body = IntegrationTreeResponse),
        (status = 403, description = "Missing INTEGRATION_EDIT", body = ApiError),
        (status = 502, description = "Hubstaff rejected the code", body = ApiError)
    ),
    tag = "hubstaff"
)]
pub async fn connect(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<ConnectHubstaffInput>,
) -> Result<(StatusCode, Json<IntegrationTreeResponse>), ApiError> {
    ctx.require_permission(PermissionsEnum::IntegrationEdit)?;

    let tree = service(&state).connect(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(tree.into())))
}

#[utoipa::path(
    get,
    path = "/api/integrations/hubstaff/{integration_id}/organizations",
    security(("bearer_auth" = [])),
    params(("integration_id" = Uuid, Path, description = "Hubstaff integration UUID")),
    responses(
        (status = 200, description = "Organizations visible to the token", body = ListResponse<HubstaffOrganization>),
        (status = 404, description = "Integration not found", body = ApiError),
        (status = 502, description = "Hubstaff request failed", body = ApiError)
    ),
    tag = "hubstaff"
)]
pub async fn organizations(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(integration_id): Path<Uuid>,
) -> Result<Json<ListResponse<HubstaffOrganization>>, ApiError> {
    let organizations = service(&state)
        .organizations(&ctx, integration_id)
        .await?;
    Ok(Json(ListResponse::from_models(organizations)))
}

#[utoipa::path(
    get,
    path = "/api/integrations/hubstaff/{integration_id}/organizations/{organization_id}/projects",
    security(("bearer_auth" = [])),
    params(
        ("integration_id" = Uuid, Path, description = "Hubstaff integration UUID"),
        ("organization_id" = i64, Path, description = "Hubstaff organization id")
    ),
    responses(
        (status = 200, description = "Projects of the Hubstaff organization", body = ListResponse<HubstaffProject>),
        (status = 404, description = "Integration not found", body = ApiError),
        (status = 502, description = "Hubstaff request failed", body = ApiError)
    ),
    tag = "hubstaff"
)]
pub async fn projects(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((integration_id, organization_id)): Path<(Uuid, i64)>,
) -> Result<Json<ListResponse<HubstaffProject>>, ApiError> {
    let projects = service(&state)
        .projects(&ctx, integration_id, organization_id)
        .await?;
    Ok(Json(ListResponse::from_models(projects)))
}
