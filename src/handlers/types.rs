//! # Common API Types
//!
//! Response shapes shared across handlers. Entity models never leave the
//! service directly; each has a DTO here built with `From`, which is where
//! password hashes and invite tokens are dropped.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::enums::{
    ContactInviteStatus, IntegrationEntity, InvitationType, InviteStatus, RolesEnum,
};
use crate::models::{
    integration_entity_setting, integration_entity_setting_tied_entity, integration_setting,
    integration_tenant, invite, organization, organization_client, organization_contact, role,
    role_permission, tenant, user,
};
use crate::services::integration::IntegrationTree;

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

/// List response with the item count
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn from_models<M>(models: Vec<M>) -> Self
    where
        T: From<M>,
    {
        let items: Vec<T> = models.into_iter().map(T::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(example = "Acme")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<tenant::Model> for TenantResponse {
    fn from(model: tenant::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub tenant_id: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub role_id: Option<Uuid>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            tenant_id: model.tenant_id,
            role_id: model.role_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub tenant_id: Uuid,
    pub name: RolesEnum,
}

impl From<role::Model> for RoleResponse {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RolePermissionResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub tenant_id: Uuid,
    #[schema(value_type = String)]
    pub role_id: Uuid,
    #[schema(example = "ORG_INVITE_EDIT")]
    pub permission: String,
    pub enabled: bool,
    pub description: Option<String>,
}

impl From<role_permission::Model> for RolePermissionResponse {
    fn from(model: role_permission::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            role_id: model.role_id,
            permission: model.permission,
            enabled: model.enabled,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub tenant_id: Uuid,
    pub name: String,
    pub currency: String,
    pub invites_allowed: bool,
    pub invite_expiry_period: Option<i32>,
    pub is_active: bool,
}

impl From<organization::Model> for OrganizationResponse {
    fn from(model: organization::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            currency: model.currency,
            invites_allowed: model.invites_allowed,
            invite_expiry_period: model.invite_expiry_period,
            is_active: model.is_active,
        }
    }
}

/// An organization contact or client
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CounterpartyResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub organization_id: Uuid,
    pub name: String,
    pub primary_email: Option<String>,
    pub invite_status: Option<ContactInviteStatus>,
    /// Organization created when the counterparty accepted an invite
    #[schema(value_type = Option<String>)]
    pub own_organization_id: Option<Uuid>,
}

impl From<organization_contact::Model> for CounterpartyResponse {
    fn from(model: organization_contact::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            primary_email: model.primary_email,
            invite_status: model.invite_status,
            own_organization_id: model.contact_organization_id,
        }
    }
}

impl From<organization_client::Model> for CounterpartyResponse {
    fn from(model: organization_client::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            primary_email: model.primary_email,
            invite_status: model.invite_status,
            own_organization_id: model.client_organization_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InviteResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub organization_id: Uuid,
    pub email: String,
    #[schema(value_type = String)]
    pub role_id: Uuid,
    #[schema(value_type = String)]
    pub invited_by_id: Uuid,
    pub status: InviteStatus,
    pub invitation_type: InvitationType,
    pub expire_date: DateTime<Utc>,
    pub action_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub organization_contact_id: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub organization_client_id: Option<Uuid>,
}

impl From<invite::Model> for InviteResponse {
    fn from(model: invite::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            email: model.email,
            role_id: model.role_id,
            invited_by_id: model.invited_by_id,
            status: model.status,
            invitation_type: model.invitation_type,
            expire_date: utc(model.expire_date),
            action_date: model.action_date.map(utc),
            organization_contact_id: model.organization_contact_id,
            organization_client_id: model.organization_client_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrationResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub tenant_id: Uuid,
    #[schema(value_type = String)]
    pub organization_id: Uuid,
    #[schema(example = "Hubstaff")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<integration_tenant::Model> for IntegrationResponse {
    fn from(model: integration_tenant::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            organization_id: model.organization_id,
            name: model.name,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrationSettingResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub setting_name: String,
    /// Masked for secret settings
    pub setting_value: String,
}

impl From<integration_setting::Model> for IntegrationSettingResponse {
    fn from(model: integration_setting::Model) -> Self {
        Self {
            id: model.id,
            setting_name: model.setting_name,
            setting_value: model.setting_value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TiedEntityResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub entity: IntegrationEntity,
    pub sync: bool,
}

impl From<integration_entity_setting_tied_entity::Model> for TiedEntityResponse {
    fn from(model: integration_entity_setting_tied_entity::Model) -> Self {
        Self {
            id: model.id,
            entity: model.entity,
            sync: model.sync,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntitySettingResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub entity: IntegrationEntity,
    pub sync: bool,
    pub tied_entities: Vec<TiedEntityResponse>,
}

impl
    From<(
        integration_entity_setting::Model,
        Vec<integration_entity_setting_tied_entity::Model>,
    )> for EntitySettingResponse
{
    fn from(
        (model, tied): (
            integration_entity_setting::Model,
            Vec<integration_entity_setting_tied_entity::Model>,
        ),
    ) -> Self {
        Self {
            id: model.id,
            entity: model.entity,
            sync: model.sync,
            tied_entities: tied.into_iter().map(TiedEntityResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrationTreeResponse {
    pub integration: IntegrationResponse,
    pub settings: Vec<IntegrationSettingResponse>,
    pub entity_settings: Vec<EntitySettingResponse>,
}

impl From<IntegrationTree> for IntegrationTreeResponse {
    fn from(tree: IntegrationTree) -> Self {
        Self {
            integration: tree.integration.into(),
            settings: tree.settings.into_iter().map(Into::into).collect(),
            entity_settings: tree.entity_settings.into_iter().map(Into::into).collect(),
        }
    }
}
