use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod dishes;
pub mod doc;
pub mod forms;
pub mod health;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/dishes", dishes::router())
        .nest("/auth", auth::router())
}
