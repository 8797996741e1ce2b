//! # Invite Repository
//!
//! Invites and their project, department and contact link rows.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::enums::{InvitationType, InviteStatus};
use crate::models::invite::{
    ActiveModel as InviteActiveModel, Column as InviteColumn, Entity as Invite,
    Model as InviteModel,
};
use crate::models::{invite_department, invite_organization_contact, invite_project};

/// An invite row plus the ids it should be linked to.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub token: String,
    pub role_id: Uuid,
    pub invited_by_id: Uuid,
    pub invitation_type: InvitationType,
    pub expire_date: DateTime<Utc>,
    pub organization_contact_id: Option<Uuid>,
    pub organization_client_id: Option<Uuid>,
    pub project_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub organization_contact_ids: Vec<Uuid>,
}

/// Optional filters for listing a tenant's invites.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct InviteFilter {
    pub organization_id: Option<Uuid>,
    pub status: Option<InviteStatus>,
    pub invitation_type: Option<InvitationType>,
}

pub struct InviteRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> InviteRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert the invite and its link rows.
    pub async fn create(&self, invite: NewInvite) -> Result<InviteModel, RepositoryError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let model = InviteActiveModel {
            id: Set(id),
            tenant_id: Set(invite.tenant_id),
            organization_id: Set(invite.organization_id),
            email: Set(invite.email),
            token: Set(invite.token),
            role_id: Set(invite.role_id),
            invited_by_id: Set(invite.invited_by_id),
            status: Set(InviteStatus::Invited),
            invitation_type: Set(invite.invitation_type),
            expire_date: Set(invite.expire_date.into()),
            action_date: Set(None),
            organization_contact_id: Set(invite.organization_contact_id),
            organization_client_id: Set(invite.organization_client_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)?;

        for project_id in invite.project_ids {
            invite_project::ActiveModel {
                invite_id: Set(id),
                project_id: Set(project_id),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        }
        for department_id in invite.department_ids {
            invite_department::ActiveModel {
                invite_id: Set(id),
                department_id: Set(department_id),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        }
        for organization_contact_id in invite.organization_contact_ids {
            invite_organization_contact::ActiveModel {
                invite_id: Set(id),
                organization_contact_id: Set(organization_contact_id),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        }

        Ok(model)
    }

    /// Emails among `emails` that already hold a live, unexpired invite to
    /// the organization.
    pub async fn find_pending_emails(
        &self,
        organization_id: Uuid,
        emails: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, RepositoryError> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let pending = Invite::find()
            .filter(InviteColumn::OrganizationId.eq(organization_id))
            .filter(InviteColumn::Email.is_in(emails.iter().cloned()))
            .filter(InviteColumn::Status.eq(InviteStatus::Invited))
            .filter(InviteColumn::ExpireDate.gte(DateTimeWithTimeZone::from(now)))
            .filter(InviteColumn::DeletedAt.is_null())
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut found: Vec<String> = pending.into_iter().map(|invite| invite.email).collect();
        found.sort();
        found.dedup();
        Ok(found)
    }

    /// The invite matching `email` and `token` if it is still open.
    pub async fn find_valid(
        &self,
        email: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InviteModel>, RepositoryError> {
        Invite::find()
            .filter(InviteColumn::Email.eq(email))
            .filter(InviteColumn::Token.eq(token))
            .filter(InviteColumn::Status.eq(InviteStatus::Invited))
            .filter(InviteColumn::ExpireDate.gte(DateTimeWithTimeZone::from(now)))
            .filter(InviteColumn::DeletedAt.is_null())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &InviteFilter,
    ) -> Result<Vec<InviteModel>, RepositoryError> {
        let mut query = Invite::find()
            .filter(InviteColumn::TenantId.eq(tenant_id))
            .filter(InviteColumn::DeletedAt.is_null());

        if let Some(organization_id) = filter.organization_id {
            query = query.filter(InviteColumn::OrganizationId.eq(organization_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(InviteColumn::Status.eq(status));
        }
        if let Some(invitation_type) = filter.invitation_type {
            query = query.filter(InviteColumn::InvitationType.eq(invitation_type));
        }

        query
            .order_by_desc(InviteColumn::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn mark_accepted(
        &self,
        invite: InviteModel,
        at: DateTime<Utc>,
    ) -> Result<InviteModel, RepositoryError> {
        let mut active = invite.into_active_model();
        active.status = Set(InviteStatus::Accepted);
        active.action_date = Set(Some(at.into()));
        active.updated_at = Set(at.into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
