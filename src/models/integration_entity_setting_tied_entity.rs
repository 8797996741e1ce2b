//! IntegrationEntitySettingTiedEntity entity model
//!
//! A dependent entity synchronized together with its parent entity setting
//! (e.g. tasks tied to projects).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::enums::IntegrationEntity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integration_entity_setting_tied_entities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Uuid,
    pub integration_entity_setting_id: Uuid,
    pub entity: IntegrationEntity,
    pub sync: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::integration_entity_setting::Entity",
        from = "Column::IntegrationEntitySettingId",
        to = "super::integration_entity_setting::Column::Id"
    )]
    IntegrationEntitySetting,
}

impl Related<super::integration_entity_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationEntitySetting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
