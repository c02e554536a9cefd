use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "honey_harvest")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub harvest_id: i32,
    pub hive_id: i32,
    pub harvest_date: Option<DateTimeUtc>,
    pub quantity: f32,
    pub quality_grade: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hive::Entity",
        from = "Column::HiveId",
        to = "super::hive::Column::HiveId"
    )]
    Hive,
}

impl Related<super::hive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
