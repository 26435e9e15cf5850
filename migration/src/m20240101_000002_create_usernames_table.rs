use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Usernames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Usernames::DeviceIdHash)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Usernames::Username).string().not_null())
                    .col(
                        ColumnDef::new(Usernames::UsernameNormalized)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Usernames::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usernames::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Usernames {
    Table,
    DeviceIdHash,
    Username,
    UsernameNormalized,
    UpdatedAt,
}
