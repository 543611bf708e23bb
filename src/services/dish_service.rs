use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, LoaderTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    dto::dishes::{
        CreateDishRequest, DishDetail, DishFilter, DishList, DishView, ImageUpload,
        RateDishRequest, UpdateDishRequest, ValidDish,
    },
    entity::{
        dish_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as DishImages,
            Model as ImageModel,
        },
        dishes::{ActiveModel as DishActive, Column as DishCol, Entity as Dishes, Model as DishModel},
        ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as Ratings, Model as RatingModel},
    },
    error::{AppError, AppResult},
    models::{Dish, DishImage, Rating, average_rating},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_dishes(state: &AppState, filter: DishFilter) -> AppResult<ApiResponse<DishList>> {
    let mut query = Dishes::find().order_by_asc(DishCol::Id);
    if let Some(category) = filter.category {
        query = query.filter(DishCol::Category.eq(category));
    }
    let mut dishes = query.all(&state.orm).await?;

    // SQLite lower() folds ASCII only; match text here
    if let Some(needle) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
    {
        dishes.retain(|dish| matches_search(dish, &needle));
    }

    let images = dishes.load_many(DishImages, &state.orm).await?;
    let ratings = dishes.load_many(Ratings, &state.orm).await?;

    let items: Vec<DishView> = dishes
        .into_iter()
        .zip(images)
        .zip(ratings)
        .map(|((dish, images), ratings)| DishView {
            average_rating: average_rating(ratings.iter().map(|r| r.stars)),
            images: ordered_images(images),
            dish: dish_from_entity(dish),
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Dishes", DishList { items }, Some(meta)))
}

pub async fn get_dish(state: &AppState, id: i32) -> AppResult<ApiResponse<DishDetail>> {
    let dish = Dishes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = load_detail(&state.orm, dish).await?;
    Ok(ApiResponse::success("Dish", detail, None))
}

pub async fn create_dish(
    state: &AppState,
    payload: CreateDishRequest,
) -> AppResult<ApiResponse<DishDetail>> {
    // nothing touches the disk or the database until the fields are valid
    let valid = payload.fields.validate()?;
    let stored = save_uploads(state, &payload.images).await?;

    let (dish, images) = match insert_dish(&state.orm, valid, &stored).await {
        Ok(saved) => saved,
        Err(err) => {
            discard_files(state, &stored).await;
            return Err(err.into());
        }
    };

    tracing::info!(dish_id = dish.id, images = images.len(), "dish created");

    let detail = DishDetail {
        dish: dish_from_entity(dish),
        average_rating: 0.0,
        images: ordered_images(images),
        ratings: Vec::new(),
    };
    Ok(ApiResponse::success("Dish created", detail, Some(Meta::empty())))
}

pub async fn update_dish(
    state: &AppState,
    id: i32,
    payload: UpdateDishRequest,
) -> AppResult<ApiResponse<DishDetail>> {
    if payload.id.is_some_and(|payload_id| payload_id != id) {
        return Err(AppError::NotFound);
    }
    let valid = payload.fields.validate()?;

    let existing = Dishes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let expected_version = payload.version.unwrap_or(existing.version);
    if expected_version != existing.version {
        return Err(AppError::Conflict);
    }

    let stored = save_uploads(state, &payload.images).await?;

    let dish = match apply_update(&state.orm, id, expected_version, valid, &stored).await {
        Ok(dish) => dish,
        Err(err) => {
            discard_files(state, &stored).await;
            return Err(err);
        }
    };

    tracing::info!(dish_id = id, new_images = stored.len(), version = dish.version, "dish updated");

    let detail = load_detail(&state.orm, dish).await?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_dish(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let dish = Dishes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let images = DishImages::find()
        .filter(ImageCol::DishId.eq(id))
        .all(&state.orm)
        .await?;

    let mut paths: Vec<&str> = images.iter().map(|i| i.image_path.as_str()).collect();
    if let Some(main) = dish.image_path.as_deref().filter(|main| !paths.contains(main)) {
        paths.push(main);
    }
    for path in paths {
        remove_file(state, path).await;
    }

    let txn = state.orm.begin().await?;
    Ratings::delete_many()
        .filter(RatingCol::DishId.eq(id))
        .exec(&txn)
        .await?;
    DishImages::delete_many()
        .filter(ImageCol::DishId.eq(id))
        .exec(&txn)
        .await?;
    let result = Dishes::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    tracing::info!(dish_id = id, images = images.len(), "dish deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    image_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let image = DishImages::find_by_id(image_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    remove_file(state, &image.image_path).await;

    let txn = state.orm.begin().await?;
    let result = DishImages::delete_by_id(image.id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if image.is_main_image {
        if state.promote_main_image_on_delete {
            let next = DishImages::find()
                .filter(ImageCol::DishId.eq(image.dish_id))
                .order_by_asc(ImageCol::Id)
                .one(&txn)
                .await?;
            match next {
                Some(next) => promote_main_image(&txn, image.dish_id, &next).await?,
                None => set_main_path(&txn, image.dish_id, None).await?,
            }
        } else {
            tracing::warn!(
                dish_id = image.dish_id,
                image_id,
                "main image deleted, dish keeps its previous main image path"
            );
        }
    }
    txn.commit().await?;

    tracing::info!(dish_id = image.dish_id, image_id, "dish image deleted");

    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({ "id": image_id, "dish_id": image.dish_id }),
        Some(Meta::empty()),
    ))
}

pub async fn rate_dish(state: &AppState, payload: RateDishRequest) -> AppResult<ApiResponse<Rating>> {
    if !(1..=5).contains(&payload.stars) {
        return Err(AppError::validation("stars", "Stars must be between 1 and 5"));
    }

    let dish_exists = Dishes::find_by_id(payload.dish_id)
        .one(&state.orm)
        .await?
        .is_some();
    if !dish_exists {
        return Err(AppError::NotFound);
    }

    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let rating = RatingActive {
        id: NotSet,
        dish_id: Set(payload.dish_id),
        stars: Set(payload.stars),
        comment: Set(comment),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(dish_id = rating.dish_id, stars = rating.stars, "dish rated");

    Ok(ApiResponse::success(
        "Rating added",
        rating_from_entity(rating),
        Some(Meta::empty()),
    ))
}

/// Write every non-empty upload to the image store, in order. On failure the files written so
/// far are removed again and the error is returned.
async fn save_uploads(state: &AppState, uploads: &[ImageUpload]) -> AppResult<Vec<String>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads.iter().filter(|u| !u.bytes.is_empty()) {
        match state.images.save(&upload.bytes, &upload.file_name).await {
            Ok(path) => stored.push(path),
            Err(err) => {
                tracing::error!(file = %upload.file_name, error = %err, "failed to store upload");
                discard_files(state, &stored).await;
                return Err(AppError::Storage(err));
            }
        }
    }
    Ok(stored)
}

async fn insert_dish(
    conn: &DatabaseConnection,
    valid: ValidDish,
    stored: &[String],
) -> Result<(DishModel, Vec<ImageModel>), DbErr> {
    let txn = conn.begin().await?;

    let dish = DishActive {
        id: NotSet,
        name: Set(valid.name),
        description: Set(valid.description),
        price: Set(valid.price),
        category: Set(valid.category),
        image_path: Set(stored.first().cloned()),
        version: Set(1),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&txn)
    .await?;

    let mut images = Vec::with_capacity(stored.len());
    for (idx, path) in stored.iter().enumerate() {
        let image = ImageActive {
            id: NotSet,
            dish_id: Set(dish.id),
            image_path: Set(path.clone()),
            is_main_image: Set(idx == 0),
        }
        .insert(&txn)
        .await?;
        images.push(image);
    }

    let dish = ensure_main_image(&txn, dish, &mut images).await?;
    txn.commit().await?;
    Ok((dish, images))
}

/// Overwrite the scalar fields if the row still carries `expected_version`, then append the
/// newly stored images as non-main images.
async fn apply_update(
    conn: &DatabaseConnection,
    id: i32,
    expected_version: i32,
    valid: ValidDish,
    stored: &[String],
) -> AppResult<DishModel> {
    let txn = conn.begin().await?;

    let result = Dishes::update_many()
        .col_expr(DishCol::Name, Expr::value(valid.name))
        .col_expr(DishCol::Description, Expr::value(valid.description))
        .col_expr(DishCol::Price, Expr::value(valid.price))
        .col_expr(DishCol::Category, Expr::value(valid.category))
        .col_expr(DishCol::Version, Expr::col(DishCol::Version).add(1))
        .filter(DishCol::Id.eq(id))
        .filter(DishCol::Version.eq(expected_version))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        txn.rollback().await?;
        let still_exists = Dishes::find_by_id(id).one(conn).await?.is_some();
        return Err(if still_exists {
            tracing::warn!(dish_id = id, expected_version, "concurrent dish modification");
            AppError::Conflict
        } else {
            AppError::NotFound
        });
    }

    for path in stored {
        ImageActive {
            id: NotSet,
            dish_id: Set(id),
            image_path: Set(path.clone()),
            is_main_image: Set(false),
        }
        .insert(&txn)
        .await?;
    }

    let mut dish = Dishes::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !stored.is_empty() {
        let mut images = DishImages::find()
            .filter(ImageCol::DishId.eq(id))
            .order_by_asc(ImageCol::Id)
            .all(&txn)
            .await?;
        dish = ensure_main_image(&txn, dish, &mut images).await?;
    }

    txn.commit().await?;
    Ok(dish)
}

/// Promote the first image when a dish has images but none is flagged main.
async fn ensure_main_image<C>(
    conn: &C,
    mut dish: DishModel,
    images: &mut [ImageModel],
) -> Result<DishModel, DbErr>
where
    C: ConnectionTrait,
{
    if images.iter().any(|i| i.is_main_image) {
        return Ok(dish);
    }
    let Some(first) = images.iter_mut().min_by_key(|i| i.id) else {
        return Ok(dish);
    };

    promote_main_image(conn, dish.id, first).await?;
    first.is_main_image = true;
    dish.image_path = Some(first.image_path.clone());
    Ok(dish)
}

async fn promote_main_image<C>(conn: &C, dish_id: i32, image: &ImageModel) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    DishImages::update_many()
        .col_expr(ImageCol::IsMainImage, Expr::value(false))
        .filter(ImageCol::DishId.eq(dish_id))
        .exec(conn)
        .await?;
    DishImages::update_many()
        .col_expr(ImageCol::IsMainImage, Expr::value(true))
        .filter(ImageCol::Id.eq(image.id))
        .exec(conn)
        .await?;
    set_main_path(conn, dish_id, Some(image.image_path.clone())).await?;

    tracing::debug!(dish_id, image_id = image.id, "promoted main image");
    Ok(())
}

async fn set_main_path<C>(conn: &C, dish_id: i32, path: Option<String>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    Dishes::update_many()
        .col_expr(DishCol::ImagePath, Expr::value(path))
        .filter(DishCol::Id.eq(dish_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn load_detail<C>(conn: &C, dish: DishModel) -> Result<DishDetail, DbErr>
where
    C: ConnectionTrait,
{
    let images = DishImages::find()
        .filter(ImageCol::DishId.eq(dish.id))
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?;
    let ratings = Ratings::find()
        .filter(RatingCol::DishId.eq(dish.id))
        .order_by_asc(RatingCol::Id)
        .all(conn)
        .await?;

    Ok(DishDetail {
        average_rating: average_rating(ratings.iter().map(|r| r.stars)),
        dish: dish_from_entity(dish),
        images: ordered_images(images),
        ratings: ratings.into_iter().map(rating_from_entity).collect(),
    })
}

/// Best-effort removal: a missing file is fine, any other failure is only logged.
async fn remove_file(state: &AppState, path: &str) {
    if let Err(err) = state.images.delete(path).await {
        tracing::warn!(path, error = %err, "failed to remove image file");
    }
}

async fn discard_files(state: &AppState, paths: &[String]) {
    for path in paths {
        remove_file(state, path).await;
    }
}

/// Case-insensitive substring match of an already lowercased `needle` against name or description.
fn matches_search(dish: &DishModel, needle: &str) -> bool {
    dish.name.to_lowercase().contains(needle) || dish.description.to_lowercase().contains(needle)
}

/// Main image first, then insertion order.
fn ordered_images(mut images: Vec<ImageModel>) -> Vec<DishImage> {
    images.sort_by_key(|i| (!i.is_main_image, i.id));
    images.into_iter().map(image_from_entity).collect()
}

fn dish_from_entity(model: DishModel) -> Dish {
    Dish {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        image_path: model.image_path,
        version: model.version,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn image_from_entity(model: ImageModel) -> DishImage {
    DishImage {
        id: model.id,
        dish_id: model.dish_id,
        image_path: model.image_path,
        is_main_image: model.is_main_image,
    }
}

fn rating_from_entity(model: RatingModel) -> Rating {
    Rating {
        id: model.id,
        dish_id: model.dish_id,
        stars: model.stars,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i32, main: bool) -> ImageModel {
        ImageModel {
            id,
            dish_id: 1,
            image_path: format!("/images/dishes/{id}.jpg"),
            is_main_image: main,
        }
    }

    fn dish(name: &str, description: &str) -> DishModel {
        DishModel {
            id: 1,
            name: name.into(),
            description: description.into(),
            price: 1500,
            category: crate::models::MealType::Lunch,
            image_path: None,
            version: 1,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn search_folds_non_ascii_letters() {
        let zurek = dish("Żurek", "Sour rye soup");
        assert!(matches_search(&zurek, &"ŻUREK".to_lowercase()));
        assert!(matches_search(&zurek, "żurek"));
        assert!(matches_search(&zurek, "rye so"));
        assert!(!matches_search(&zurek, "barszcz"));
    }

    #[test]
    fn search_treats_wildcards_literally() {
        assert!(!matches_search(&dish("Soup", "Plain"), "%"));
        assert!(matches_search(&dish("Lunch deal", "20% off"), "%"));
    }

    #[test]
    fn main_image_sorts_first() {
        let ordered = ordered_images(vec![image(3, false), image(2, true), image(1, false)]);
        let ids: Vec<i32> = ordered.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
