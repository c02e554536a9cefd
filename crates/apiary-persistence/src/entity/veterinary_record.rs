use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "veterinary_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub record_id: i32,
    pub passport_id: i32,
    pub record_date: Option<DateTimeUtc>,
    pub description: String,
    pub treatment: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::veterinary_passport::Entity",
        from = "Column::PassportId",
        to = "super::veterinary_passport::Column::PassportId"
    )]
    Passport,
}

impl Related<super::veterinary_passport::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
