//! String-backed enums persisted as text columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Built-in role names; every tenant owns one role row per value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RolesEnum {
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "DATA_ENTRY")]
    DataEntry,
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "CANDIDATE")]
    Candidate,
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    #[sea_orm(string_value = "VIEWER")]
    Viewer,
}

impl RolesEnum {
    pub fn as_str(&self) -> &'static str {
        match self {
            RolesEnum::SuperAdmin => "SUPER_ADMIN",
            RolesEnum::Admin => "ADMIN",
            RolesEnum::DataEntry => "DATA_ENTRY",
            RolesEnum::Employee => "EMPLOYEE",
            RolesEnum::Candidate => "CANDIDATE",
            RolesEnum::Manager => "MANAGER",
            RolesEnum::Viewer => "VIEWER",
        }
    }
}

impl std::fmt::Display for RolesEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an invite. `Expired` is informational; expiry is judged from `expire_date`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    #[sea_orm(string_value = "INVITED")]
    Invited,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

/// What the invitee joins as; selects the mail template.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationType {
    #[default]
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "CANDIDATE")]
    Candidate,
}

/// Invite state mirrored onto organization contacts and clients.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactInviteStatus {
    #[sea_orm(string_value = "NOT_INVITED")]
    NotInvited,
    #[sea_orm(string_value = "INVITED")]
    Invited,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
}

/// Domain entities an integration can synchronize.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationEntity {
    #[sea_orm(string_value = "ORGANIZATION")]
    Organization,
    #[sea_orm(string_value = "CLIENT")]
    Client,
    #[sea_orm(string_value = "PROJECT")]
    Project,
    #[sea_orm(string_value = "TASK")]
    Task,
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "ACTIVITY")]
    Activity,
    #[sea_orm(string_value = "TIME_LOG")]
    TimeLog,
    #[sea_orm(string_value = "TIME_SLOT")]
    TimeSlot,
    #[sea_orm(string_value = "SCREENSHOT")]
    Screenshot,
    #[sea_orm(string_value = "NOTE")]
    Note,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn role_names_serialize_like_database_values() {
        for role in RolesEnum::iter() {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
            assert_eq!(role.to_value(), role.as_str());
        }
    }
}
