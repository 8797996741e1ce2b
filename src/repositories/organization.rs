//! # Organization Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::organization::{ActiveModel as OrganizationActiveModel, Model as OrganizationModel};

/// Longest invite expiry an organization may configure, in days.
pub const MAX_INVITE_EXPIRY_DAYS: i32 = 365;

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub currency: Option<String>,
    pub invites_allowed: Option<bool>,
    pub invite_expiry_period: Option<i32>,
}

impl NewOrganization {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: None,
            invites_allowed: None,
            invite_expiry_period: None,
        }
    }
}

pub struct OrganizationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> OrganizationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        organization: NewOrganization,
    ) -> Result<OrganizationModel, RepositoryError> {
        let name = organization.name.trim();
        if name.is_empty() {
            return Err(RepositoryError::validation_error(
                "Organization name cannot be empty",
            ));
        }
        if let Some(days) = organization.invite_expiry_period
            && !(1..=MAX_INVITE_EXPIRY_DAYS).contains(&days)
        {
            return Err(RepositoryError::validation_error(format!(
                "Invite expiry period must be between 1 and {MAX_INVITE_EXPIRY_DAYS} days"
            )));
        }

        let now = Utc::now();
        OrganizationActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name.to_string()),
            currency: Set(organization
                .currency
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "USD".to_string())),
            invites_allowed: Set(organization.invites_allowed.unwrap_or(true)),
            invite_expiry_period: Set(organization.invite_expiry_period),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }
}
