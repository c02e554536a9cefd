use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hive")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub hive_id: i32,
    pub apiary_id: i32,
    pub hive_type: String,
    pub installation_date: Option<DateTimeUtc>,
    pub current_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apiary::Entity",
        from = "Column::ApiaryId",
        to = "super::apiary::Column::ApiaryId"
    )]
    Apiary,
    #[sea_orm(has_many = "super::bee_community::Entity")]
    BeeCommunity,
    #[sea_orm(has_many = "super::sensor::Entity")]
    Sensor,
}

impl Related<super::apiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apiary.def()
    }
}

impl Related<super::bee_community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BeeCommunity.def()
    }
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
