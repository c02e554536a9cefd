use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weather_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub weather_id: i32,
    pub region_id: i32,
    pub date: Option<DateTimeUtc>,
    pub temperature: f32,
    pub humidity: f32,
    pub wind_speed: f32,
    pub precipitation: f32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::RegionId"
    )]
    Region,
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
