use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub device_id_hash: String,
    pub round_id: String,
    pub started_at: DateTimeUtc,
    pub question_count: i32,
    pub hint_used: bool,
    pub solved: bool,
    pub solved_at: Option<DateTimeUtc>,
    pub solve_question_index: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id"
    )]
    Round,
    #[sea_orm(has_many = "super::question_events::Entity")]
    QuestionEvents,
    #[sea_orm(has_many = "super::guess_events::Entity")]
    GuessEvents,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl Related<super::question_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionEvents.def()
    }
}

impl Related<super::guess_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuessEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
