use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::storage::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub images: Arc<dyn ImageStore>,
    pub jwt_secret: Arc<str>,
    /// Promote the next image to main when the main image is deleted on its own.
    pub promote_main_image_on_delete: bool,
}
