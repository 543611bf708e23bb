use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Meal type a dish is listed under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[sea_orm(num_value = 1)]
    Breakfast,
    #[sea_orm(num_value = 2)]
    Lunch,
    #[sea_orm(num_value = 3)]
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    /// Accepts the lowercase name or the stored number (`1`..=`3`), ignoring case and padding.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breakfast" | "1" => Some(MealType::Breakfast),
            "lunch" | "2" => Some(MealType::Lunch),
            "dinner" | "3" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dish {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Price in minor units (1/100).
    pub price: i64,
    pub category: MealType,
    pub image_path: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DishImage {
    pub id: i32,
    pub dish_id: i32,
    pub image_path: String,
    pub is_main_image: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub id: i32,
    pub dish_id: i32,
    pub stars: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Arithmetic mean of the given star values, 0 when there are none.
pub fn average_rating<I>(stars: I) -> f64
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = stars
        .into_iter()
        .fold((0_i64, 0_u32), |(sum, count), s| (sum + i64::from(s), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / f64::from(count)
    }
}
