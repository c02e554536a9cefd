use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bee_community")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub community_id: i32,
    pub hive_id: i32,
    pub queen_age: i32,
    pub population_estimate: i32,
    pub health_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hive::Entity",
        from = "Column::HiveId",
        to = "super::hive::Column::HiveId"
    )]
    Hive,
    #[sea_orm(has_many = "super::veterinary_passport::Entity")]
    VeterinaryPassport,
}

impl Related<super::hive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hive.def()
    }
}

impl Related<super::veterinary_passport::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VeterinaryPassport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
