use sea_orm::entity::prelude::*;

use crate::models::MealType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Minor currency units (1/100).
    pub price: i64,
    pub category: MealType,
    /// Mirrors the path of the image flagged `is_main_image`.
    pub image_path: Option<String>,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dish_images::Entity")]
    DishImages,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
}

impl Related<super::dish_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DishImages.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
