use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub region_id: i32,
    pub name: String,
    pub climate_zone: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::region_apiary::Entity")]
    RegionApiary,
    #[sea_orm(has_many = "super::allowed_region::Entity")]
    AllowedRegion,
    #[sea_orm(has_many = "super::weather_data::Entity")]
    WeatherData,
}

impl Related<super::region_apiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RegionApiary.def()
    }
}

impl Related<super::allowed_region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllowedRegion.def()
    }
}

impl Related<super::weather_data::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeatherData.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
