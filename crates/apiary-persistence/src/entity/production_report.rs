use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_report")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub report_id: i32,
    pub apiary_id: i32,
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,
    pub total_honey_produced: f64,
    pub total_expenses: f64,
    pub curated_by: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apiary::Entity",
        from = "Column::ApiaryId",
        to = "super::apiary::Column::ApiaryId"
    )]
    Apiary,
}

impl Related<super::apiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apiary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
