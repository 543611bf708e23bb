use axum::{
    Form, Json, Router,
    extract::{
        Multipart, Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::dishes::{
        CreateDishRequest, DeleteImageRequest, DishDetail, DishFormInfo, DishList, DishUploadForm,
        RateDishRequest, UpdateDishRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Rating,
    response::{ApiResponse, Meta},
    routes::{forms::read_dish_form, params::DishQuery},
    services::dish_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dishes))
        .route("/details/{id}", get(dish_details))
        .route("/create", get(create_form).post(create_dish))
        .route("/edit/{id}", get(edit_form).post(edit_dish))
        .route("/delete/{id}", get(delete_confirm).post(delete_dish))
        .route("/deleteimage", post(delete_image))
        .route("/rate", post(rate_dish))
}

#[utoipa::path(
    get,
    path = "/dishes",
    params(DishQuery),
    responses(
        (status = 200, description = "Filtered dish listing", body = ApiResponse<DishList>),
        (status = 422, description = "Unknown category"),
    ),
    tag = "Dishes"
)]
pub async fn list_dishes(
    State(state): State<AppState>,
    query: Result<Query<DishQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<DishList>>> {
    let Query(query) = query?;
    let resp = dish_service::list_dishes(&state, query.into_filter()?).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/dishes/details/{id}",
    params(("id" = i32, Path, description = "Dish ID")),
    responses(
        (status = 200, description = "Dish with images and ratings", body = ApiResponse<DishDetail>),
        (status = 404, description = "Dish not found"),
    ),
    tag = "Dishes"
)]
pub async fn dish_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<DishDetail>>> {
    let resp = dish_service::get_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/dishes/create",
    responses(
        (status = 200, description = "Categories and limits for an empty dish form", body = ApiResponse<DishFormInfo>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn create_form(user: AuthUser) -> AppResult<Json<ApiResponse<DishFormInfo>>> {
    ensure_admin(&user)?;
    Ok(Json(ApiResponse::success(
        "Dish form",
        DishFormInfo::default(),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/dishes/create",
    request_body(content = DishUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Dish created", body = ApiResponse<DishDetail>),
        (status = 422, description = "Invalid dish fields"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn create_dish(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<DishDetail>>)> {
    ensure_admin(&user)?;
    let form = read_dish_form(multipart).await?;
    let payload = CreateDishRequest {
        fields: form.fields,
        images: form.images,
    };
    let resp = dish_service::create_dish(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/dishes/edit/{id}",
    params(("id" = i32, Path, description = "Dish ID")),
    responses(
        (status = 200, description = "Dish to prefill the edit form", body = ApiResponse<DishDetail>),
        (status = 404, description = "Dish not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn edit_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<DishDetail>>> {
    ensure_admin(&user)?;
    let resp = dish_service::get_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/dishes/edit/{id}",
    params(("id" = i32, Path, description = "Dish ID")),
    request_body(content = DishUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Dish updated, new images appended", body = ApiResponse<DishDetail>),
        (status = 404, description = "Dish not found or id mismatch"),
        (status = 409, description = "Dish was modified concurrently"),
        (status = 422, description = "Invalid dish fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn edit_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<DishDetail>>> {
    ensure_admin(&user)?;
    let form = read_dish_form(multipart).await?;
    let payload = UpdateDishRequest {
        id: form.id,
        version: form.version,
        fields: form.fields,
        images: form.images,
    };
    let resp = dish_service::update_dish(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/dishes/delete/{id}",
    params(("id" = i32, Path, description = "Dish ID")),
    responses(
        (status = 200, description = "Dish pending deletion", body = ApiResponse<DishDetail>),
        (status = 404, description = "Dish not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_confirm(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<DishDetail>>> {
    ensure_admin(&user)?;
    let resp = dish_service::get_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/dishes/delete/{id}",
    params(("id" = i32, Path, description = "Dish ID")),
    responses(
        (status = 200, description = "Dish, its images and ratings deleted"),
        (status = 404, description = "Dish not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = dish_service::delete_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/dishes/deleteimage",
    request_body(content = DeleteImageRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Image and its file deleted"),
        (status = 404, description = "Image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Form<DeleteImageRequest>, FormRejection>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let Form(payload) = payload?;
    let resp = dish_service::delete_image(&state, payload.image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/dishes/rate",
    request_body(content = RateDishRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Rating added", body = ApiResponse<Rating>),
        (status = 404, description = "Dish not found"),
        (status = 422, description = "Stars outside 1..=5"),
    ),
    tag = "Dishes"
)]
pub async fn rate_dish(
    State(state): State<AppState>,
    payload: Result<Form<RateDishRequest>, FormRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Rating>>)> {
    let Form(payload) = payload?;
    let resp = dish_service::rate_dish(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
