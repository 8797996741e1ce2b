//! # Organizations API Handlers
//!
//! Organizations plus their contacts and clients. Contacts and clients can be
//! invited to a workspace of their own.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handlers::types::{CounterpartyResponse, InviteResponse, ListResponse, OrganizationResponse};
use crate::server::AppState;
use crate::services::invite::{InviteCounterpartyInput, InviteService};
use crate::services::organization::{self, CreateCounterpartyInput, CreateOrganizationInput};

#[utoipa::path(
    post,
    path = "/api/organization",
    security(("bearer_auth" = [])),
    request_body = CreateOrganizationInput,
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Missing ALL_ORG_EDIT", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateOrganizationInput>,
) -> Result<(StatusCode, Json<OrganizationResponse>), ApiError> {
    let organization = organization::create_organization(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(organization.into())))
}

#[utoipa::path(
    get,
    path = "/api/organization",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Organizations of the caller's tenant", body = ListResponse<OrganizationResponse>),
        (status = 403, description = "Missing ALL_ORG_VIEW", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ListResponse<OrganizationResponse>>, ApiError> {
    let organizations = organization::list_organizations(&state.db, &ctx).await?;
    Ok(Json(ListResponse::from_models(organizations)))
}

#[utoipa::path(
    post,
    path = "/api/organization-contact",
    security(("bearer_auth" = [])),
    request_body = CreateCounterpartyInput,
    responses(
        (status = 201, description = "Contact created", body = CounterpartyResponse),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateCounterpartyInput>,
) -> Result<(StatusCode, Json<CounterpartyResponse>), ApiError> {
    let contact = organization::create_contact(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(contact.into())))
}

#[utoipa::path(
    get,
    path = "/api/organization-contact",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Contacts of the caller's tenant", body = ListResponse<CounterpartyResponse>)
    ),
    tag = "organizations"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ListResponse<CounterpartyResponse>>, ApiError> {
    let contacts = organization::list_contacts(&state.db, &ctx).await?;
    Ok(Json(ListResponse::from_models(contacts)))
}

/// Invite a contact to create their own workspace
#[utoipa::path(
    post,
    path = "/api/organization-contact/{id}/invite",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Organization contact UUID")),
    request_body = InviteCounterpartyInput,
    responses(
        (status = 201, description = "Invite sent", body = InviteResponse),
        (status = 400, description = "Contact has no primary email", body = ApiError),
        (status = 404, description = "Contact not found", body = ApiError),
        (status = 409, description = "Contact already has an open invite", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn invite_contact(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(input): Json<InviteCounterpartyInput>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let invite = InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .invite_organization_contact(&ctx, id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}

#[utoipa::path(
    post,
    path = "/api/organization-clients",
    security(("bearer_auth" = [])),
    request_body = CreateCounterpartyInput,
    responses(
        (status = 201, description = "Client created", body = CounterpartyResponse),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn create_client(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateCounterpartyInput>,
) -> Result<(StatusCode, Json<CounterpartyResponse>), ApiError> {
    let client = organization::create_client(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    get,
    path = "/api/organization-clients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Clients of the caller's tenant", body = ListResponse<CounterpartyResponse>)
    ),
    tag = "organizations"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ListResponse<CounterpartyResponse>>, ApiError> {
    let clients = organization::list_clients(&state.db, &ctx).await?;
    Ok(Json(ListResponse::from_models(clients)))
}

/// Invite a client to create their own workspace
#[utoipa::path(
    post,
    path = "/api/organization-clients/{id}/invite",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Organization client UUID")),
    request_body = InviteCounterpartyInput,
    responses(
        (status = 201, description = "Invite sent", body = InviteResponse),
        (status = 404, description = "Client not found", body = ApiError),
        (status = 409, description = "Client already has an open invite", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn invite_client(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(input): Json<InviteCounterpartyInput>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let invite = InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .invite_organization_client(&ctx, id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}
