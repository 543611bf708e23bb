use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DishImages::Table)
                    .if_not_exists()
                    .col(pk_auto(DishImages::Id))
                    .col(integer(DishImages::DishId))
                    .col(string_len(DishImages::ImagePath, 255))
                    .col(boolean(DishImages::IsMainImage).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dish_images_dish")
                            .from(DishImages::Table, DishImages::DishId)
                            .to(Dishes::Table, Dishes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dish_images_dish")
                    .table(DishImages::Table)
                    .col(DishImages::DishId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DishImages::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DishImages { Table, Id, DishId, ImagePath, IsMainImage }

#[derive(DeriveIden)]
enum Dishes { Table, Id }
