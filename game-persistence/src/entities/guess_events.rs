use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guess_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub round_id: String,
    pub session_id: String,
    pub guess_text: String,
    pub is_correct: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device_sessions::Entity",
        from = "Column::SessionId",
        to = "super::device_sessions::Column::Id"
    )]
    DeviceSession,
}

impl Related<super::device_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
