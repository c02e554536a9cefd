use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_plan")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub plan_id: i32,
    pub apiary_id: i32,
    pub planned_date: Option<DateTimeUtc>,
    pub work_type: String,
    pub assigned_to: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apiary::Entity",
        from = "Column::ApiaryId",
        to = "super::apiary::Column::ApiaryId"
    )]
    Apiary,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::UserId"
    )]
    Assignee,
}

impl Related<super::apiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apiary.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
