//! # Data Models
//!
//! SeaORM entities for tenants, roles, invites and the integration tree.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod enums;
pub mod integration_entity_setting;
pub mod integration_entity_setting_tied_entity;
pub mod integration_setting;
pub mod integration_tenant;
pub mod invite;
pub mod invite_department;
pub mod invite_organization_contact;
pub mod invite_project;
pub mod organization;
pub mod organization_client;
pub mod organization_contact;
pub mod role;
pub mod role_permission;
pub mod tenant;
pub mod user;
pub mod user_organization;

pub use integration_entity_setting::Entity as IntegrationEntitySetting;
pub use integration_entity_setting_tied_entity::Entity as IntegrationEntitySettingTiedEntity;
pub use integration_setting::Entity as IntegrationSetting;
pub use integration_tenant::Entity as IntegrationTenant;
pub use invite::Entity as Invite;
pub use invite_department::Entity as InviteDepartment;
pub use invite_organization_contact::Entity as InviteOrganizationContact;
pub use invite_project::Entity as InviteProject;
pub use organization::Entity as Organization;
pub use organization_client::Entity as OrganizationClient;
pub use organization_contact::Entity as OrganizationContact;
pub use role::Entity as Role;
pub use role_permission::Entity as RolePermission;
pub use tenant::Entity as Tenant;
pub use user::Entity as User;
pub use user_organization::Entity as UserOrganization;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "workforce".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
