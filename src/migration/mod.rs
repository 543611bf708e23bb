//! Embedded migrator; tables are created parents first so foreign keys resolve.
pub use sea_orm_migration::prelude::*;

mod m20251114_000001_create_users;
mod m20251114_000002_create_dishes;
mod m20251114_000003_create_dish_images;
mod m20251114_000004_create_ratings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251114_000001_create_users::Migration),
            Box::new(m20251114_000002_create_dishes::Migration),
            Box::new(m20251114_000003_create_dish_images::Migration),
            Box::new(m20251114_000004_create_ratings::Migration),
        ]
    }
}
