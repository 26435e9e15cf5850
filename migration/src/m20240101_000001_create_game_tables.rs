use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Persons::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Persons::DisplayName).string().not_null())
                    .col(ColumnDef::new(Persons::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Persons::RevealText).string().not_null())
                    .col(ColumnDef::new(Persons::ImageUrl).string().null())
                    .col(ColumnDef::new(Persons::HintText).string().not_null())
                    .col(
                        ColumnDef::new(Persons::IsIcelander)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Persons::MetadataJson).text().null())
                    .col(
                        ColumnDef::new(Persons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rounds::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rounds::PersonId).string().not_null())
                    .col(
                        ColumnDef::new(Rounds::OpensAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::ClosesAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rounds::StatusOverride).string().null())
                    .col(ColumnDef::new(Rounds::HintText).string().null())
                    .col(
                        ColumnDef::new(Rounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeviceSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeviceSessions::DeviceIdHash).string().not_null())
                    .col(ColumnDef::new(DeviceSessions::RoundId).string().not_null())
                    .col(
                        ColumnDef::new(DeviceSessions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceSessions::QuestionCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DeviceSessions::HintUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DeviceSessions::Solved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DeviceSessions::SolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DeviceSessions::SolveQuestionIndex)
                            .integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One session per device and round
        manager
            .create_index(
                Index::create()
                    .name("idx_device_sessions_device_round_unique")
                    .table(DeviceSessions::Table)
                    .col(DeviceSessions::DeviceIdHash)
                    .col(DeviceSessions::RoundId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Leaderboard lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_device_sessions_round_solved")
                    .table(DeviceSessions::Table)
                    .col(DeviceSessions::RoundId)
                    .col(DeviceSessions::Solved)
                    .col(DeviceSessions::SolvedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuestionEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuestionEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuestionEvents::RoundId).string().not_null())
                    .col(ColumnDef::new(QuestionEvents::SessionId).string().not_null())
                    .col(ColumnDef::new(QuestionEvents::QuestionText).string().not_null())
                    .col(ColumnDef::new(QuestionEvents::AnswerLabel).string().not_null())
                    .col(ColumnDef::new(QuestionEvents::AnswerText).string().not_null())
                    .col(ColumnDef::new(QuestionEvents::LatencyMs).big_integer().null())
                    .col(
                        ColumnDef::new(QuestionEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_question_events_session_created")
                    .table(QuestionEvents::Table)
                    .col(QuestionEvents::SessionId)
                    .col(QuestionEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GuessEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GuessEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GuessEvents::RoundId).string().not_null())
                    .col(ColumnDef::new(GuessEvents::SessionId).string().not_null())
                    .col(ColumnDef::new(GuessEvents::GuessText).string().not_null())
                    .col(ColumnDef::new(GuessEvents::IsCorrect).boolean().not_null())
                    .col(
                        ColumnDef::new(GuessEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_guess_events_session_created")
                    .table(GuessEvents::Table)
                    .col(GuessEvents::SessionId)
                    .col(GuessEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuessEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuestionEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rounds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    Id,
    DisplayName,
    Slug,
    RevealText,
    ImageUrl,
    HintText,
    IsIcelander,
    MetadataJson,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Rounds {
    Table,
    Id,
    PersonId,
    OpensAt,
    ClosesAt,
    StatusOverride,
    HintText,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceSessions {
    Table,
    Id,
    DeviceIdHash,
    RoundId,
    StartedAt,
    QuestionCount,
    HintUsed,
    Solved,
    SolvedAt,
    SolveQuestionIndex,
}

#[derive(DeriveIden)]
enum QuestionEvents {
    Table,
    Id,
    RoundId,
    SessionId,
    QuestionText,
    AnswerLabel,
    AnswerText,
    LatencyMs,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GuessEvents {
    Table,
    Id,
    RoundId,
    SessionId,
    GuessText,
    IsCorrect,
    CreatedAt,
}
