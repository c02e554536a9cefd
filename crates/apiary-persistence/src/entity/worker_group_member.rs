use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join row between a worker group and one of its worker users.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "worker_group_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub worker_id: i32,
    pub joined_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::worker_group::Entity",
        from = "Column::GroupId",
        to = "super::worker_group::Column::GroupId"
    )]
    WorkerGroup,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::WorkerId",
        to = "super::user::Column::UserId"
    )]
    Worker,
}

impl Related<super::worker_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkerGroup.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
