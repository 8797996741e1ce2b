//! Invite issuance and validation.
//!
//! An invite is a row keyed by `(email, token)` where the token is an HS256
//! JWT carrying only the email. It is open while its status is `INVITED` and
//! its `expire_date` has not passed; expiry is never written back.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::mail::{InviteEmail, InviteMailer, MailTemplate, accept_url};
use crate::models::enums::{ContactInviteStatus, InvitationType, RolesEnum};
use crate::models::invite::Model as InviteModel;
use crate::models::organization::Model as OrganizationModel;
use crate::models::role::Model as RoleModel;
use crate::models::{Invite, Organization, OrganizationClient, OrganizationContact, Role};
use crate::permissions::PermissionsEnum;
use crate::repositories::invite::{InviteFilter, NewInvite};
use crate::repositories::{InviteRepository, OrganizationContactRepository, TenantScopedRepository};
use crate::services::normalize_email;

/// Payload of an invite token. It carries no `exp`; expiry lives on the
/// invite row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InviteClaims {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateInvitesInput {
    pub emails: Vec<String>,
    pub role_id: Uuid,
    pub organization_id: Uuid,
    #[serde(default)]
    pub project_ids: Vec<Uuid>,
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
    #[serde(default)]
    pub organization_contact_ids: Vec<Uuid>,
    #[serde(default)]
    pub invitation_type: InvitationType,
    pub start_date: Option<DateTime<Utc>>,
}

/// Invite a counterparty (organization contact or client) to their own workspace.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InviteCounterpartyInput {
    pub role_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateInvitesResult {
    pub items: Vec<InviteModel>,
    pub total: usize,
    pub ignored: usize,
}

/// Counterparty an invite is addressed to.
#[derive(Debug, Clone, Copy)]
enum Counterparty {
    Contact(Uuid),
    Client(Uuid),
}

/// Invite operations need the pool, configuration and a mailer.
pub struct InviteService<'a> {
    db: &'a DatabaseConnection,
    config: &'a AppConfig,
    mailer: &'a dyn InviteMailer,
}

impl<'a> InviteService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        config: &'a AppConfig,
        mailer: &'a dyn InviteMailer,
    ) -> Self {
        Self { db, config, mailer }
    }

    /// Invite every email that has no open invite to the organization yet.
    #[instrument(skip(self, ctx, input), fields(user_id = %ctx.user_id(), organization_id = %input.organization_id))]
    pub async fn create_bulk(
        &self,
        ctx: &RequestContext,
        input: CreateInvitesInput,
    ) -> ServiceResult<CreateInvitesResult> {
        ctx.require_permission(PermissionsEnum::OrgInviteEdit)?;
        let tenant_id = ctx.tenant_id()?;

        let emails = dedupe_emails(&input.emails)?;
        if emails.is_empty() {
            return Err(ServiceError::bad_request("At least one email is required"));
        }

        let (organization, role) = self
            .resolve_target(ctx, tenant_id, input.organization_id, input.role_id)
            .await?;

        let now = Utc::now();
        let expire_date = self.expire_date(&organization, now)?;
        let txn = self.db.begin().await?;
        let invites = InviteRepository::new(&txn);

        let pending: HashSet<String> = invites
            .find_pending_emails(organization.id, &emails, now)
            .await?
            .into_iter()
            .collect();

        let mut items = Vec::new();
        for email in emails.iter().filter(|email| !pending.contains(*email)) {
            let invite = invites
                .create(NewInvite {
                    tenant_id,
                    organization_id: organization.id,
                    email: email.clone(),
                    token: self.sign_token(email)?,
                    role_id: role.id,
                    invited_by_id: ctx.user_id(),
                    invitation_type: input.invitation_type,
                    expire_date,
                    organization_contact_id: None,
                    organization_client_id: None,
                    project_ids: input.project_ids.clone(),
                    department_ids: input.department_ids.clone(),
                    organization_contact_ids: input.organization_contact_ids.clone(),
                })
                .await?;
            items.push(invite);
        }

        txn.commit().await?;

        let ignored = pending.len() + (input.emails.len() - emails.len());
        counter!("invites_created_total").increment(items.len() as u64);
        counter!("invites_ignored_total").increment(ignored as u64);
        info!(created = items.len(), ignored, "Created invites");

        for invite in &items {
            self.dispatch(ctx, invite, &organization, input.start_date)
                .await;
        }

        Ok(CreateInvitesResult {
            total: items.len(),
            items,
            ignored,
        })
    }

    /// The open invite for `(email, token)`. Unknown, accepted and expired
    /// invites are all reported as not found.
    pub async fn validate(&self, email: &str, token: &str) -> ServiceResult<InviteModel> {
        let not_found = || ServiceError::not_found("Invite not found");
        let email = normalize_email(email).map_err(|_| not_found())?;

        InviteRepository::new(self.db)
            .find_valid(&email, token, Utc::now())
            .await?
            .ok_or_else(not_found)
    }

    pub async fn invite_organization_contact(
        &self,
        ctx: &RequestContext,
        contact_id: Uuid,
        input: InviteCounterpartyInput,
    ) -> ServiceResult<InviteModel> {
        self.invite_counterparty(ctx, Counterparty::Contact(contact_id), input)
            .await
    }

    pub async fn invite_organization_client(
        &self,
        ctx: &RequestContext,
        client_id: Uuid,
        input: InviteCounterpartyInput,
    ) -> ServiceResult<InviteModel> {
        self.invite_counterparty(ctx, Counterparty::Client(client_id), input)
            .await
    }

    pub async fn find_all(
        &self,
        ctx: &RequestContext,
        filter: &InviteFilter,
    ) -> ServiceResult<Vec<InviteModel>> {
        ctx.require_permission(PermissionsEnum::OrgInviteView)?;
        let tenant_id = ctx.tenant_id()?;
        Ok(InviteRepository::new(self.db)
            .list(tenant_id, filter)
            .await?)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<()> {
        ctx.require_permission(PermissionsEnum::OrgInviteEdit)?;
        let tenant_id = ctx.tenant_id()?;
        TenantScopedRepository::<_, Invite>::new(self.db, tenant_id)
            .soft_delete(id, "Invite")
            .await?;
        Ok(())
    }

    /// Decode an invite token. Signature is checked, expiry is not.
    pub fn decode_token(&self, token: &str) -> ServiceResult<InviteClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        decode::<InviteClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::bad_request("Invalid invite token"))
    }

    fn sign_token(&self, email: &str) -> ServiceResult<String> {
        encode(
            &Header::default(),
            &InviteClaims {
                email: email.to_string(),
            },
            &EncodingKey::from_secret(self.config.jwt_secret().as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to sign invite token: {e}")))
    }

    fn expire_date(
        &self,
        organization: &OrganizationModel,
        now: DateTime<Utc>,
    ) -> ServiceResult<DateTime<Utc>> {
        let days = organization
            .invite_expiry_period
            .map(i64::from)
            .unwrap_or(self.config.invite_expiry_days);
        Duration::try_days(days)
            .and_then(|period| now.checked_add_signed(period))
            .ok_or_else(|| ServiceError::bad_request("Invite expiry period is out of range"))
    }

    async fn resolve_target(
        &self,
        ctx: &RequestContext,
        tenant_id: Uuid,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> ServiceResult<(OrganizationModel, RoleModel)> {
        let organization = TenantScopedRepository::<_, Organization>::new(self.db, tenant_id)
            .get(organization_id, "Organization")
            .await?;
        if !organization.invites_allowed {
            return Err(ServiceError::bad_request(
                "Organization does not allow invites",
            ));
        }

        let role = TenantScopedRepository::<_, Role>::new(self.db, tenant_id)
            .get(role_id, "Role")
            .await?;
        if role.name == RolesEnum::SuperAdmin && !ctx.has_role(RolesEnum::SuperAdmin) {
            return Err(ServiceError::Unauthorized(
                "Only a SUPER_ADMIN can invite with the SUPER_ADMIN role".to_string(),
            ));
        }

        Ok((organization, role))
    }

    #[instrument(skip(self, ctx, input), fields(user_id = %ctx.user_id()))]
    async fn invite_counterparty(
        &self,
        ctx: &RequestContext,
        counterparty: Counterparty,
        input: InviteCounterpartyInput,
    ) -> ServiceResult<InviteModel> {
        ctx.require_permission(PermissionsEnum::OrgInviteEdit)?;
        let tenant_id = ctx.tenant_id()?;

        let (organization_id, primary_email) = match counterparty {
            Counterparty::Contact(id) => {
                let contact = TenantScopedRepository::<_, OrganizationContact>::new(self.db, tenant_id)
                    .get(id, "Organization contact")
                    .await?;
                (contact.organization_id, contact.primary_email)
            }
            Counterparty::Client(id) => {
                let client = TenantScopedRepository::<_, OrganizationClient>::new(self.db, tenant_id)
                    .get(id, "Organization client")
                    .await?;
                (client.organization_id, client.primary_email)
            }
        };
        let email = primary_email
            .as_deref()
            .map(normalize_email)
            .transpose()?
            .ok_or_else(|| ServiceError::bad_request("Primary email is required to send an invite"))?;

        let (organization, role) = self
            .resolve_target(ctx, tenant_id, organization_id, input.role_id)
            .await?;

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let invites = InviteRepository::new(&txn);

        if !invites
            .find_pending_emails(organization.id, std::slice::from_ref(&email), now)
            .await?
            .is_empty()
        {
            return Err(ServiceError::Conflict(
                "An invite is already pending for this email".to_string(),
            ));
        }

        let (contact_id, client_id) = match counterparty {
            Counterparty::Contact(id) => (Some(id), None),
            Counterparty::Client(id) => (None, Some(id)),
        };
        let invite = invites
            .create(NewInvite {
                tenant_id,
                organization_id: organization.id,
                token: self.sign_token(&email)?,
                email,
                role_id: role.id,
                invited_by_id: ctx.user_id(),
                invitation_type: InvitationType::User,
                expire_date: self.expire_date(&organization, now)?,
                organization_contact_id: contact_id,
                organization_client_id: client_id,
                project_ids: Vec::new(),
                department_ids: Vec::new(),
                organization_contact_ids: Vec::new(),
            })
            .await?;

        let counterparties = OrganizationContactRepository::new(&txn);
        match counterparty {
            Counterparty::Contact(id) => {
                let contact = TenantScopedRepository::<_, OrganizationContact>::new(&txn, tenant_id)
                    .get(id, "Organization contact")
                    .await?;
                counterparties
                    .update_contact_invite(contact, ContactInviteStatus::Invited, None)
                    .await?;
            }
            Counterparty::Client(id) => {
                let client = TenantScopedRepository::<_, OrganizationClient>::new(&txn, tenant_id)
                    .get(id, "Organization client")
                    .await?;
                counterparties
                    .update_client_invite(client, ContactInviteStatus::Invited, None)
                    .await?;
            }
        }

        txn.commit().await?;
        counter!("invites_created_total").increment(1);

        self.dispatch(ctx, &invite, &organization, None).await;
        Ok(invite)
    }

    /// Send the invite mail. Failures are logged and swallowed.
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        invite: &InviteModel,
        organization: &OrganizationModel,
        start_date: Option<DateTime<Utc>>,
    ) {
        let url = match accept_url(&self.config.client_base_url, &invite.email, &invite.token) {
            Ok(url) => url,
            Err(err) => {
                warn!(invite_id = %invite.id, error = %err, "Could not build invite link");
                return;
            }
        };

        let mail = InviteEmail {
            from: self.config.mail_from.clone(),
            to: invite.email.clone(),
            template: MailTemplate::for_invitation(invite.invitation_type),
            organization_name: organization.name.clone(),
            invited_by: display_name(ctx),
            accept_url: url,
            expire_date: invite.expire_date.with_timezone(&Utc),
            start_date,
        };

        if let Err(err) = self.mailer.send_invite(mail).await {
            warn!(invite_id = %invite.id, error = %err, "Failed to send invite mail");
        }
    }
}

fn display_name(ctx: &RequestContext) -> String {
    let parts: Vec<&str> = [ctx.user.first_name.as_deref(), ctx.user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        ctx.user.email.clone()
    } else {
        parts.join(" ")
    }
}

/// Normalize every address and drop repeats, keeping first-seen order.
fn dedupe_emails(raw: &[String]) -> ServiceResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut emails = Vec::with_capacity(raw.len());
    for email in raw {
        let email = normalize_email(email)?;
        if seen.insert(email.clone()) {
            emails.push(email);
        }
    }
    Ok(emails)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_emails_collapse_in_order() {
        let emails = dedupe_emails(&[
            "B@acme.test".to_string(),
            "a@acme.test".to_string(),
            " b@ACME.test ".to_string(),
        ])
        .unwrap();
        assert_eq!(emails, vec!["b@acme.test", "a@acme.test"]);
    }

    #[test]
    fn malformed_email_fails_the_batch() {
        let result = dedupe_emails(&["a@acme.test".to_string(), "nope".to_string()]);
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    }
}
