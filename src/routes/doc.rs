use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        dishes::{
            DeleteImageRequest, DishDetail, DishFormInfo, DishList, DishUploadForm, DishView,
            RateDishRequest,
        },
    },
    error::FieldError,
    models::{Dish, DishImage, MealType, Rating, User},
    response::{ApiResponse, Meta},
    routes::{auth, dishes, health},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        dishes::list_dishes,
        dishes::dish_details,
        dishes::create_form,
        dishes::create_dish,
        dishes::edit_form,
        dishes::edit_dish,
        dishes::delete_confirm,
        dishes::delete_dish,
        dishes::delete_image,
        dishes::rate_dish
    ),
    components(
        schemas(
            User,
            Dish,
            DishImage,
            Rating,
            MealType,
            DishView,
            DishDetail,
            DishList,
            DishFormInfo,
            DishUploadForm,
            RateDishRequest,
            DeleteImageRequest,
            LoginRequest,
            LoginResponse,
            FieldError,
            Meta,
            ApiResponse<DishList>,
            ApiResponse<DishDetail>,
            ApiResponse<Rating>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Dishes", description = "Menu browsing, administration and ratings"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
