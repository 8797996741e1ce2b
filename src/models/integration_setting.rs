//! IntegrationSetting entity model
//!
//! Named key/value setting of an integration. Secret values are stored sealed
//! (see [`crate::crypto::seal_setting_value`]).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integration_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub integration_id: Uuid,
    pub setting_name: String,
    pub setting_value: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::integration_tenant::Entity",
        from = "Column::IntegrationId",
        to = "super::integration_tenant::Column::Id"
    )]
    IntegrationTenant,
}

impl Related<super::integration_tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationTenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
