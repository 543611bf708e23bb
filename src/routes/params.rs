use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::dishes::DishFilter,
    error::{AppError, AppResult},
    models::MealType,
};

/// Query string of the dish listing. Empty values count as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DishQuery {
    /// Case-insensitive text matched against name and description.
    #[serde(rename = "searchString")]
    pub search_string: Option<String>,
    /// `breakfast`, `lunch` or `dinner`.
    pub category: Option<String>,
}

impl DishQuery {
    pub fn into_filter(self) -> AppResult<DishFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(MealType::parse(value).ok_or_else(|| {
                AppError::validation("category", format!("Unknown category {value:?}"))
            })?),
        };
        Ok(DishFilter {
            search: self.search_string.filter(|s| !s.trim().is_empty()),
            category,
        })
    }
}
