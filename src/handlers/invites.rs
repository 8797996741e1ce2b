//! # Invites API Handlers
//!
//! Bulk invite issuance and listing for tenant members, plus the public
//! validate and accept endpoints an invitee reaches from the mailed link.

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
use crate::handlers::query::DataQuery;
use crate::handlers::types::{
    InviteResponse, ListResponse, OrganizationResponse, TenantResponse, UserResponse,
};
use crate::repositories::invite::InviteFilter;
use crate::server::AppState;
use crate::services::invite::{CreateInvitesInput, InviteService};
use crate::services::invite_accept::{
    AcceptInviteInput, AcceptOrganizationClientInvite, AcceptOrganizationClientInviteHandler,
    AcceptOrganizationContactInvite, AcceptOrganizationContactInviteHandler, AcceptedInvite,
    CommandHandler,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateInvitesResponse {
    pub items: Vec<InviteResponse>,
    pub total: usize,
    /// Emails skipped because they already had an open invite
    pub ignored: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ValidateInviteQuery {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptedInviteResponse {
    pub user: UserResponse,
    pub tenant: TenantResponse,
    pub organization: OrganizationResponse,
    pub invite: InviteResponse,
}

impl From<AcceptedInvite> for AcceptedInviteResponse {
    fn from(accepted: AcceptedInvite) -> Self {
        Self {
            user: accepted.user.into(),
            tenant: accepted.tenant.into(),
            organization: accepted.organization.into(),
            invite: accepted.invite.into(),
        }
    }
}

/// Invite a batch of emails to an organization
#[utoipa::path(
    post,
    path = "/api/invite/emails",
    security(("bearer_auth" = [])),
    request_body = CreateInvitesInput,
    responses(
        (status = 201, description = "Invites created", body = CreateInvitesResponse),
        (status = 400, description = "Invalid email or invites disabled", body = ApiError),
        (status = 401, description = "Caller may not grant the requested role", body = ApiError),
        (status = 403, description = "Missing ORG_INVITE_EDIT", body = ApiError),
        (status = 404, description = "Organization or role not found", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn create_invites(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(input): Json<CreateInvitesInput>,
) -> Result<(StatusCode, Json<CreateInvitesResponse>), ApiError> {
    let result = InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .create_bulk(&ctx, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInvitesResponse {
            items: result.items.into_iter().map(Into::into).collect(),
            total: result.total,
            ignored: result.ignored,
        }),
    ))
}

/// List invites of the caller's tenant
///
/// Filter with `data={"organization_id": "...", "status": "INVITED"}`.
#[utoipa::path(
    get,
    path = "/api/invite",
    security(("bearer_auth" = [])),
    params(("data" = Option<String>, Query, description = "JSON encoded InviteFilter")),
    responses(
        (status = 200, description = "Invites", body = ListResponse<InviteResponse>),
        (status = 400, description = "Malformed data parameter", body = ApiError),
        (status = 403, description = "Missing ORG_INVITE_VIEW", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn list_invites(
    State(state): State<AppState>,
    ctx: RequestContext,
    DataQuery(filter): DataQuery<InviteFilter>,
) -> Result<Json<ListResponse<InviteResponse>>, ApiError> {
    let invites = InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .find_all(&ctx, &filter)
        .await?;
    Ok(Json(ListResponse::from_models(invites)))
}

#[utoipa::path(
    delete,
    path = "/api/invite/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invite UUID")),
    responses(
        (status = 204, description = "Invite removed"),
        (status = 404, description = "Invite not found", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn delete_invite(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .delete(&ctx, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check an invite link
#[utoipa::path(
    get,
    path = "/api/invite/validate",
    params(ValidateInviteQuery),
    responses(
        (status = 200, description = "Invite is open", body = InviteResponse),
        (status = 404, description = "Invite unknown, accepted or expired", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn validate_invite(
    State(state): State<AppState>,
    Query(query): Query<ValidateInviteQuery>,
) -> Result<Json<InviteResponse>, ApiError> {
    let invite = InviteService::new(&state.db, &state.config, state.mailer.as_ref())
        .validate(&query.email, &query.token)
        .await?;
    Ok(Json(invite.into()))
}

/// Accept an organization contact invite
#[utoipa::path(
    post,
    path = "/api/invite/contact/accept",
    request_body = AcceptInviteInput,
    responses(
        (status = 201, description = "Workspace created for the contact", body = AcceptedInviteResponse),
        (status = 400, description = "Invite is not addressed to a contact", body = ApiError),
        (status = 404, description = "Invite unknown, accepted or expired", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn accept_contact_invite(
    State(state): State<AppState>,
    Json(input): Json<AcceptInviteInput>,
) -> Result<(StatusCode, Json<AcceptedInviteResponse>), ApiError> {
    let accepted = AcceptOrganizationContactInviteHandler::new(state.db.clone())
        .execute(AcceptOrganizationContactInvite(input))
        .await?;
    Ok((StatusCode::CREATED, Json(accepted.into())))
}

/// Accept an organization client invite
#[utoipa::path(
    post,
    path = "/api/invite/client/accept",
    request_body = AcceptInviteInput,
    responses(
        (status = 201, description = "Workspace created for the client", body = AcceptedInviteResponse),
        (status = 400, description = "Invite is not addressed to a client", body = ApiError),
        (status = 404, description = "Invite unknown, accepted or expired", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "invites"
)]
pub async fn accept_client_invite(
    State(state): State<AppState>,
    Json(input): Json<AcceptInviteInput>,
) -> Result<(StatusCode, Json<AcceptedInviteResponse>), ApiError> {
    let accepted = AcceptOrganizationClientInviteHandler::new(state.db.clone())
        .execute(AcceptOrganizationClientInvite(input))
        .await?;
    Ok((StatusCode::CREATED, Json(accepted.into())))
}
