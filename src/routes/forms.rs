//! Decoding of the multipart dish form posted by the admin create and edit pages.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use crate::{
    dto::dishes::{DishFields, ImageUpload},
    error::{AppError, AppResult},
    models::MealType,
};

/// Raw contents of a dish form.
#[derive(Debug, Default)]
pub struct DishForm {
    pub id: Option<i32>,
    pub version: Option<i32>,
    pub fields: DishFields,
    pub images: Vec<ImageUpload>,
}

pub async fn read_dish_form(mut multipart: Multipart) -> AppResult<DishForm> {
    let mut form = DishForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "imageFiles" | "imageFile" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    form.images.push(ImageUpload::new(file_name, bytes.to_vec()));
                }
            }
            "id" | "name" | "description" | "price" | "category" | "version" => {
                let value = field.text().await.map_err(multipart_error)?;
                apply_text_field(&mut form, &name, &value)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

fn apply_text_field(form: &mut DishForm, name: &str, value: &str) -> AppResult<()> {
    match name {
        "id" => form.id = parse_number(name, value)?,
        "version" => form.version = parse_number(name, value)?,
        "name" => form.fields.name = value.to_string(),
        "description" => form.fields.description = value.to_string(),
        "price" => form.fields.price = parse_price(value),
        "category" => form.fields.category = MealType::parse(value),
        _ => {}
    }
    Ok(())
}

/// Blank means absent; anything else must be an integer.
fn parse_number(name: &str, value: &str) -> AppResult<Option<i32>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{name} must be an integer, got {value:?}")))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

/// Parse a decimal price (`12`, `12.5`, `12,50`) into minor units. At most two fractional
/// digits are accepted.
pub fn parse_price(raw: &str) -> Option<i64> {
    let raw = raw.trim().replace(',', ".");
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 2
    {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let minor = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -minor } else { minor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_parse_into_minor_units() {
        assert_eq!(parse_price("12"), Some(1200));
        assert_eq!(parse_price("12.5"), Some(1250));
        assert_eq!(parse_price(" 12,05 "), Some(1205));
        assert_eq!(parse_price("0.01"), Some(1));
        assert_eq!(parse_price(".99"), Some(99));
        assert_eq!(parse_price("-3"), Some(-300));
    }

    #[test]
    fn malformed_prices_are_rejected() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("."), None);
        assert_eq!(parse_price("1.234"), None);
        assert_eq!(parse_price("ten"), None);
        assert_eq!(parse_price("1e3"), None);
        assert_eq!(parse_price("99999999999999999999"), None);
    }

    #[test]
    fn text_fields_fill_the_form() {
        let mut form = DishForm::default();
        apply_text_field(&mut form, "id", "7").unwrap();
        apply_text_field(&mut form, "name", "Omelette").unwrap();
        apply_text_field(&mut form, "price", "15.90").unwrap();
        apply_text_field(&mut form, "category", "breakfast").unwrap();
        apply_text_field(&mut form, "version", " ").unwrap();

        assert_eq!(form.id, Some(7));
        assert_eq!(form.version, None);
        assert_eq!(form.fields.name, "Omelette");
        assert_eq!(form.fields.price, Some(1590));
        assert_eq!(form.fields.category, Some(MealType::Breakfast));
    }

    #[test]
    fn malformed_id_or_version_is_a_bad_request() {
        let mut form = DishForm::default();
        let err = apply_text_field(&mut form, "id", "abc").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = apply_text_field(&mut form, "version", "2.5").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(form.id, None);
        assert_eq!(form.version, None);
    }
}
