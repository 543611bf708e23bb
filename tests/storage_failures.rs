mod common;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{create, fields, setup, setup_with_store, upload};
use restaurant_menu_api::{
    dto::dishes::{CreateDishRequest, UpdateDishRequest},
    entity::{DishImages, Dishes},
    error::AppError,
    models::MealType,
    services::dish_service,
    storage::{ImageStore, LocalImageStore},
};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

/// Local store whose `save` fails on the n-th call (1-based).
struct FailingStore {
    inner: LocalImageStore,
    fail_on: usize,
    saves: AtomicUsize,
}

impl FailingStore {
    fn over(dir: &Path, fail_on: usize) -> Arc<dyn ImageStore> {
        Arc::new(Self {
            inner: LocalImageStore::new(dir),
            fail_on,
            saves: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ImageStore for FailingStore {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> io::Result<String> {
        if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(io::Error::other("disk full"));
        }
        self.inner.save(bytes, suggested_name).await
    }

    async fn delete(&self, path: &str) -> io::Result<()> {
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &str) -> io::Result<bool> {
        self.inner.exists(path).await
    }
}

#[tokio::test]
async fn failed_write_on_create_leaves_no_rows_or_files() -> anyhow::Result<()> {
    let app = setup_with_store(|dir| FailingStore::over(dir, 2)).await?;

    let err = dish_service::create_dish(
        &app.state,
        CreateDishRequest {
            fields: fields("Bigos", "Hunter's stew", MealType::Dinner),
            images: vec![upload("one.jpg"), upload("two.jpg"), upload("three.jpg")],
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(Dishes::find().count(&app.state.orm).await?, 0);
    assert_eq!(DishImages::find().count(&app.state.orm).await?, 0);
    assert_eq!(app.stored_file_count(), 0);
    Ok(())
}

#[tokio::test]
async fn failed_write_on_update_keeps_dish_unchanged() -> anyhow::Result<()> {
    // the first save belongs to the create below
    let app = setup_with_store(|dir| FailingStore::over(dir, 3)).await?;
    let created = create(&app, fields("Bigos", "Hunter's stew", MealType::Dinner), vec![upload("main.jpg")]).await?;

    let err = dish_service::update_dish(
        &app.state,
        created.dish.id,
        UpdateDishRequest {
            version: Some(created.dish.version),
            fields: fields("Bigos", "Changed", MealType::Dinner),
            images: vec![upload("extra.jpg"), upload("broken.jpg")],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    let current = dish_service::get_dish(&app.state, created.dish.id)
        .await?
        .data
        .expect("dish");
    assert_eq!(current.dish.description, "Hunter's stew");
    assert_eq!(current.dish.version, created.dish.version);
    assert_eq!(current.images.len(), 1);
    assert_eq!(app.stored_file_count(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_database_write_discards_stored_files() -> anyhow::Result<()> {
    let app = setup().await?;
    app.state
        .orm
        .execute_unprepared("DROP TABLE dish_images")
        .await?;

    let err = dish_service::create_dish(
        &app.state,
        CreateDishRequest {
            fields: fields("Bigos", "Hunter's stew", MealType::Dinner),
            images: vec![upload("one.jpg"), upload("two.jpg")],
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::OrmError(_)));
    assert_eq!(Dishes::find().count(&app.state.orm).await?, 0);
    assert_eq!(app.stored_file_count(), 0);
    Ok(())
}
