use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "veterinary_passport")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub passport_id: i32,
    pub bee_community_id: i32,
    pub issue_date: Option<DateTimeUtc>,
    pub health_status: String,
    pub last_inspection_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bee_community::Entity",
        from = "Column::BeeCommunityId",
        to = "super::bee_community::Column::CommunityId"
    )]
    BeeCommunity,
    #[sea_orm(has_many = "super::veterinary_record::Entity")]
    VeterinaryRecord,
}

impl Related<super::bee_community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BeeCommunity.def()
    }
}

impl Related<super::veterinary_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VeterinaryRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
