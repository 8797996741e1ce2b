//! IntegrationEntitySetting entity model
//!
//! Whether a given domain entity is synchronized for an integration.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::enums::IntegrationEntity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integration_entity_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub integration_id: Uuid,
    pub entity: IntegrationEntity,
    pub sync: bool,
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
    #[sea_orm(has_many = "super::integration_entity_setting_tied_entity::Entity")]
    TiedEntity,
}

impl Related<super::integration_tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationTenant.def()
    }
}

impl Related<super::integration_entity_setting_tied_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TiedEntity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
