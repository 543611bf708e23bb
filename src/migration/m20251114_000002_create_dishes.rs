use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dishes::Table)
                    .if_not_exists()
                    .col(pk_auto(Dishes::Id))
                    .col(string_len(Dishes::Name, 100))
                    .col(string_len(Dishes::Description, 500))
                    .col(big_integer(Dishes::Price))
                    .col(integer(Dishes::Category))
                    .col(string_len_null(Dishes::ImagePath, 255))
                    .col(integer(Dishes::Version).default(1))
                    .col(
                        timestamp_with_time_zone(Dishes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dishes_name")
                    .table(Dishes::Table)
                    .col(Dishes::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Dishes::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Dishes { Table, Id, Name, Description, Price, Category, ImagePath, Version, CreatedAt }
