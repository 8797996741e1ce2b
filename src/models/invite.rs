//! Invite entity model
//!
//! An invitation for an email address to join an organization with a role.
//! The `token` is a signed JWT whose only claim is the invited email.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::enums::{InvitationType, InviteStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub token: String,
    pub role_id: Uuid,
    pub invited_by_id: Uuid,
    pub status: InviteStatus,
    pub invitation_type: InvitationType,
    pub expire_date: DateTimeWithTimeZone,
    /// Set when the invite is accepted
    pub action_date: Option<DateTimeWithTimeZone>,
    pub organization_contact_id: Option<Uuid>,
    pub organization_client_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
