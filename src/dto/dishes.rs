use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, FieldError},
    models::{Dish, DishImage, MealType, Rating},
};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
/// 0.01 in minor units.
pub const PRICE_MIN: i64 = 1;
/// 10000.00 in minor units.
pub const PRICE_MAX: i64 = 1_000_000;

/// Scalar dish fields as submitted by the admin form, before validation.
#[derive(Debug, Clone, Default)]
pub struct DishFields {
    pub name: String,
    pub description: String,
    /// Minor units; `None` when the field was missing or not a number.
    pub price: Option<i64>,
    pub category: Option<MealType>,
}

/// Dish fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDish {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: MealType,
}

impl DishFields {
    /// Check every field and report all violations at once.
    pub fn validate(&self) -> Result<ValidDish, AppError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() > NAME_MAX_LEN {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {NAME_MAX_LEN} characters"),
            ));
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        } else if description.chars().count() > DESCRIPTION_MAX_LEN {
            errors.push(FieldError::new(
                "description",
                format!("Description must be at most {DESCRIPTION_MAX_LEN} characters"),
            ));
        }

        match self.price {
            None => errors.push(FieldError::new("price", "Price is required")),
            Some(price) if !(PRICE_MIN..=PRICE_MAX).contains(&price) => errors.push(
                FieldError::new("price", "Price must be between 0.01 and 10000.00"),
            ),
            Some(_) => {}
        }

        if self.category.is_none() {
            errors.push(FieldError::new("category", "Category is required"));
        }

        match (self.price, self.category) {
            (Some(price), Some(category)) if errors.is_empty() => Ok(ValidDish {
                name: name.to_string(),
                description: description.to_string(),
                price,
                category,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Listing filter; both parts are optional and ANDed together.
#[derive(Debug, Clone, Default)]
pub struct DishFilter {
    pub search: Option<String>,
    pub category: Option<MealType>,
}

/// One uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateDishRequest {
    pub fields: DishFields,
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDishRequest {
    /// Dish id echoed by the edit form; must match the id in the path when present.
    pub id: Option<i32>,
    /// Version the edit form was rendered from; the loaded version is used when absent.
    pub version: Option<i32>,
    pub fields: DishFields,
    pub images: Vec<ImageUpload>,
}

/// Multipart body accepted by the create and edit endpoints (documentation only).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct DishUploadForm {
    pub id: Option<i32>,
    pub version: Option<i32>,
    pub name: String,
    pub description: String,
    /// Decimal price, e.g. `12.50`.
    pub price: String,
    pub category: MealType,
    #[schema(value_type = Vec<String>, format = Binary)]
    #[allow(non_snake_case)]
    pub imageFiles: Vec<Vec<u8>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateDishRequest {
    pub dish_id: i32,
    pub stars: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub image_id: i32,
}

/// A dish with its images, main image first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DishView {
    pub dish: Dish,
    pub average_rating: f64,
    pub images: Vec<DishImage>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DishDetail {
    pub dish: Dish,
    pub average_rating: f64,
    pub images: Vec<DishImage>,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DishList {
    #[schema(value_type = Vec<DishView>)]
    pub items: Vec<DishView>,
}

/// Static data an admin needs to render an empty dish form.
#[derive(Debug, Serialize, ToSchema)]
pub struct DishFormInfo {
    pub categories: Vec<MealType>,
    pub name_max_len: usize,
    pub description_max_len: usize,
    pub price_min: i64,
    pub price_max: i64,
}

impl Default for DishFormInfo {
    fn default() -> Self {
        Self {
            categories: MealType::ALL.to_vec(),
            name_max_len: NAME_MAX_LEN,
            description_max_len: DESCRIPTION_MAX_LEN,
            price_min: PRICE_MIN,
            price_max: PRICE_MAX,
        }
    }
}
