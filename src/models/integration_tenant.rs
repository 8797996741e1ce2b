//! IntegrationTenant entity model
//!
//! Root of a tenant's configuration for one third-party integration.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integration_tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    /// Integration name, e.g. `Hubstaff`
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::integration_setting::Entity")]
    IntegrationSetting,
    #[sea_orm(has_many = "super::integration_entity_setting::Entity")]
    IntegrationEntitySetting,
}

impl Related<super::integration_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationSetting.def()
    }
}

impl Related<super::integration_entity_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationEntitySetting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
