#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use restaurant_menu_api::{
    db::{create_orm_conn, run_migrations},
    dto::dishes::{CreateDishRequest, DishDetail, DishFields, ImageUpload},
    models::MealType,
    services::dish_service,
    state::AppState,
    storage::{ImageStore, LocalImageStore},
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// Application state backed by a throwaway SQLite file and image directory.
pub struct TestApp {
    pub state: AppState,
    pub image_dir: PathBuf,
    db_file: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.image_dir);
        let _ = std::fs::remove_file(&self.db_file);
    }
}

impl TestApp {
    /// Number of files currently in the image directory.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(&self.image_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub async fn setup() -> anyhow::Result<TestApp> {
    setup_with(false).await
}

pub async fn setup_with(promote_main_image_on_delete: bool) -> anyhow::Result<TestApp> {
    build(promote_main_image_on_delete, |dir| {
        Arc::new(LocalImageStore::new(dir)) as Arc<dyn ImageStore>
    })
    .await
}

/// Like [`setup`], with the image store built by `make_store` over the temp image directory.
pub async fn setup_with_store<F>(make_store: F) -> anyhow::Result<TestApp>
where
    F: FnOnce(&Path) -> Arc<dyn ImageStore>,
{
    build(false, make_store).await
}

async fn build<F>(promote_main_image_on_delete: bool, make_store: F) -> anyhow::Result<TestApp>
where
    F: FnOnce(&Path) -> Arc<dyn ImageStore>,
{
    let run = Uuid::new_v4();
    let db_file = std::env::temp_dir().join(format!("menu_test_{run}.db"));
    let image_dir = std::env::temp_dir().join(format!("menu_test_images_{run}"));

    let orm = create_orm_conn(&format!("sqlite://{}?mode=rwc", db_file.display())).await?;
    run_migrations(&orm).await?;

    let state = AppState {
        orm,
        images: make_store(&image_dir),
        jwt_secret: Arc::from(JWT_SECRET),
        promote_main_image_on_delete,
    };

    Ok(TestApp {
        state,
        image_dir,
        db_file,
    })
}

pub fn fields(name: &str, description: &str, category: MealType) -> DishFields {
    DishFields {
        name: name.to_string(),
        description: description.to_string(),
        price: Some(1999),
        category: Some(category),
    }
}

pub fn upload(file_name: &str) -> ImageUpload {
    ImageUpload::new(file_name, format!("bytes of {file_name}").into_bytes())
}

pub async fn create(
    app: &TestApp,
    fields: DishFields,
    images: Vec<ImageUpload>,
) -> anyhow::Result<DishDetail> {
    let resp = dish_service::create_dish(&app.state, CreateDishRequest { fields, images }).await?;
    Ok(resp.data.expect("created dish"))
}
