//! # Organization Contact & Client Repository
//!
//! Contacts and clients are the two kinds of counterparty an organization can
//! invite into their own workspace. Both carry an `invite_status` and, once
//! accepted, the id of the organization created for them.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::enums::ContactInviteStatus;
use crate::models::organization_client::{
    ActiveModel as OrganizationClientActiveModel, Model as OrganizationClientModel,
};
use crate::models::organization_contact::{
    ActiveModel as OrganizationContactActiveModel, Model as OrganizationContactModel,
};

#[derive(Debug, Clone)]
pub struct NewCounterparty {
    pub organization_id: Uuid,
    pub name: String,
    pub primary_email: Option<String>,
}

pub struct OrganizationContactRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> OrganizationContactRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create_contact(
        &self,
        tenant_id: Uuid,
        input: NewCounterparty,
    ) -> Result<OrganizationContactModel, RepositoryError> {
        let (name, primary_email) = normalize(input.name, input.primary_email)?;
        let now = Utc::now();

        OrganizationContactActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            organization_id: Set(input.organization_id),
            name: Set(name),
            primary_email: Set(primary_email),
            invite_status: Set(Some(ContactInviteStatus::NotInvited)),
            contact_organization_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn create_client(
        &self,
        tenant_id: Uuid,
        input: NewCounterparty,
    ) -> Result<OrganizationClientModel, RepositoryError> {
        let (name, primary_email) = normalize(input.name, input.primary_email)?;
        let now = Utc::now();

        OrganizationClientActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            organization_id: Set(input.organization_id),
            name: Set(name),
            primary_email: Set(primary_email),
            invite_status: Set(Some(ContactInviteStatus::NotInvited)),
            client_organization_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Set the contact's invite status and, when given, its own organization.
    pub async fn update_contact_invite(
        &self,
        contact: OrganizationContactModel,
        status: ContactInviteStatus,
        contact_organization_id: Option<Uuid>,
    ) -> Result<OrganizationContactModel, RepositoryError> {
        let mut active = contact.into_active_model();
        active.invite_status = Set(Some(status));
        if let Some(organization_id) = contact_organization_id {
            active.contact_organization_id = Set(Some(organization_id));
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Set the client's invite status and, when given, its own organization.
    pub async fn update_client_invite(
        &self,
        client: OrganizationClientModel,
        status: ContactInviteStatus,
        client_organization_id: Option<Uuid>,
    ) -> Result<OrganizationClientModel, RepositoryError> {
        let mut active = client.into_active_model();
        active.invite_status = Set(Some(status));
        if let Some(organization_id) = client_organization_id {
            active.client_organization_id = Set(Some(organization_id));
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

fn normalize(
    name: String,
    primary_email: Option<String>,
) -> Result<(String, Option<String>), RepositoryError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(RepositoryError::validation_error("Name cannot be empty"));
    }
    let primary_email = primary_email
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty());
    Ok((name, primary_email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_email_becomes_none() {
        let (name, email) = normalize(" Globex ".into(), Some("  ".into())).unwrap();
        assert_eq!(name, "Globex");
        assert_eq!(email, None);
    }

    #[test]
    fn email_is_lowercased() {
        let (_, email) = normalize("Globex".into(), Some(" Ops@Globex.COM ".into())).unwrap();
        assert_eq!(email.as_deref(), Some("ops@globex.com"));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(normalize("   ".into(), None).is_err());
    }
}
