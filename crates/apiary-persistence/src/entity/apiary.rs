use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apiary")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub apiary_id: i32,
    pub location: String,
    pub manager_id: i32,
    pub establishment_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ManagerId",
        to = "super::user::Column::UserId"
    )]
    Manager,
    #[sea_orm(has_many = "super::hive::Entity")]
    Hive,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manager.def()
    }
}

impl Related<super::hive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
