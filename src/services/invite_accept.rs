//! Invite acceptance for organization contacts and clients.
//!
//! Accepting a counterparty invite gives the invitee a workspace of their own:
//! a fresh tenant and organization, a `SUPER_ADMIN` role with its default
//! permissions, and a user that stays linked to the inviting organization.
//! The two commands share one sequence and differ only in which counterparty
//! row records the result.

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::{ContactInviteStatus, RolesEnum};
use crate::models::invite::Model as InviteModel;
use crate::models::organization::Model as OrganizationModel;
use crate::models::tenant::Model as TenantModel;
use crate::models::user::Model as UserModel;
use crate::models::{OrganizationClient, OrganizationContact};
use crate::repositories::organization::NewOrganization;
use crate::repositories::{
    InviteRepository, OrganizationContactRepository, OrganizationRepository, RoleRepository,
    TenantRepository, TenantScopedRepository,
};
use crate::services::normalize_email;
use crate::services::role_permissions;
use crate::services::users::{self, Membership, RegisterInput};

/// Executes one command type.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    type Output;

    async fn execute(&self, command: C) -> ServiceResult<Self::Output>;
}

/// The organization the invitee is creating for themselves.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AcceptedOrganizationInput {
    pub name: String,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AcceptInviteInput {
    pub email: String,
    pub token: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: AcceptedOrganizationInput,
}

#[derive(Debug, Clone)]
pub struct AcceptOrganizationContactInvite(pub AcceptInviteInput);

#[derive(Debug, Clone)]
pub struct AcceptOrganizationClientInvite(pub AcceptInviteInput);

#[derive(Debug, Clone)]
pub struct AcceptedInvite {
    pub user: UserModel,
    pub tenant: TenantModel,
    pub organization: OrganizationModel,
    pub invite: InviteModel,
}

pub struct AcceptOrganizationContactInviteHandler {
    db: DatabaseConnection,
}

impl AcceptOrganizationContactInviteHandler {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommandHandler<AcceptOrganizationContactInvite> for AcceptOrganizationContactInviteHandler {
    type Output = AcceptedInvite;

    async fn execute(&self, command: AcceptOrganizationContactInvite) -> ServiceResult<AcceptedInvite> {
        accept_invite(&self.db, command.0, CounterpartyKind::Contact).await
    }
}

pub struct AcceptOrganizationClientInviteHandler {
    db: DatabaseConnection,
}

impl AcceptOrganizationClientInviteHandler {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommandHandler<AcceptOrganizationClientInvite> for AcceptOrganizationClientInviteHandler {
    type Output = AcceptedInvite;

    async fn execute(&self, command: AcceptOrganizationClientInvite) -> ServiceResult<AcceptedInvite> {
        accept_invite(&self.db, command.0, CounterpartyKind::Client).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterpartyKind {
    Contact,
    Client,
}

impl CounterpartyKind {
    fn label(self) -> &'static str {
        match self {
            CounterpartyKind::Contact => "contact",
            CounterpartyKind::Client => "client",
        }
    }

    fn target(self, invite: &InviteModel) -> Option<Uuid> {
        match self {
            CounterpartyKind::Contact => invite.organization_contact_id,
            CounterpartyKind::Client => invite.organization_client_id,
        }
    }
}

#[instrument(skip(db, input), fields(kind = kind.label()))]
async fn accept_invite(
    db: &DatabaseConnection,
    input: AcceptInviteInput,
    kind: CounterpartyKind,
) -> ServiceResult<AcceptedInvite> {
    let not_found = || ServiceError::not_found("Invite not found");
    let email = normalize_email(&input.email).map_err(|_| not_found())?;

    let txn = db.begin().await?;

    let invite = InviteRepository::new(&txn)
        .find_valid(&email, &input.token, Utc::now())
        .await?
        .ok_or_else(not_found)?;
    let counterparty_id = kind.target(&invite).ok_or_else(|| {
        ServiceError::bad_request(format!("Invite is not addressed to an organization {}", kind.label()))
    })?;

    let tenant = TenantRepository::new(&txn)
        .create_tenant(&input.organization.name)
        .await?;

    let organization = OrganizationRepository::new(&txn)
        .create(
            tenant.id,
            NewOrganization {
                currency: input.organization.currency.clone(),
                ..NewOrganization::named(input.organization.name.clone())
            },
        )
        .await?;

    let role = RoleRepository::new(&txn)
        .create_role(tenant.id, RolesEnum::SuperAdmin)
        .await?;
    role_permissions::update_roles(&txn, &tenant, &role).await?;

    let user = users::register(
        &txn,
        RegisterInput {
            email: invite.email.clone(),
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
        },
        Some(Membership {
            tenant_id: tenant.id,
            role_id: role.id,
            organization_id: Some(invite.organization_id),
        }),
    )
    .await?;

    mark_counterparty_accepted(&txn, &invite, kind, counterparty_id, organization.id).await?;

    let invite = InviteRepository::new(&txn)
        .mark_accepted(invite, Utc::now())
        .await?;

    txn.commit().await?;

    counter!("invites_accepted_total").increment(1);
    info!(
        invite_id = %invite.id,
        tenant_id = %tenant.id,
        user_id = %user.id,
        "Accepted invite"
    );

    Ok(AcceptedInvite {
        user,
        tenant,
        organization,
        invite,
    })
}

async fn mark_counterparty_accepted(
    txn: &DatabaseTransaction,
    invite: &InviteModel,
    kind: CounterpartyKind,
    counterparty_id: Uuid,
    organization_id: Uuid,
) -> ServiceResult<()> {
    let repo = OrganizationContactRepository::new(txn);

    match kind {
        CounterpartyKind::Contact => {
            let contact = TenantScopedRepository::<_, OrganizationContact>::new(txn, invite.tenant_id)
                .get(counterparty_id, "Organization contact")
                .await?;
            repo.update_contact_invite(contact, ContactInviteStatus::Accepted, Some(organization_id))
                .await?;
        }
        CounterpartyKind::Client => {
            let client = TenantScopedRepository::<_, OrganizationClient>::new(txn, invite.tenant_id)
                .get(counterparty_id, "Organization client")
                .await?;
            repo.update_client_invite(client, ContactInviteStatus::Accepted, Some(organization_id))
                .await?;
        }
    }

    Ok(())
}
