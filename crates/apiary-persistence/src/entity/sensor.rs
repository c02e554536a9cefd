use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sensor")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub sensor_id: i32,
    pub hive_id: i32,
    pub sensor_type: String,
    #[serde(default, with = "apiary_common::bytes::base64_bytes_opt")]
    pub last_reading: Option<Vec<u8>>,
    pub last_reading_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hive::Entity",
        from = "Column::HiveId",
        to = "super::hive::Column::HiveId"
    )]
    Hive,
    #[sea_orm(has_many = "super::sensor_reading::Entity")]
    SensorReading,
}

impl Related<super::hive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hive.def()
    }
}

impl Related<super::sensor_reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SensorReading.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
