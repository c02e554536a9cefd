use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub user_id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    pub role: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash; accepted on input, never echoed back.
    #[serde(default, skip_serializing)]
    pub password: String,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::apiary::Entity")]
    Apiary,
    #[sea_orm(has_many = "super::allowed_region::Entity")]
    AllowedRegion,
}

impl Related<super::apiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apiary.def()
    }
}

impl Related<super::allowed_region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllowedRegion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
