mod common;

use common::setup;
use restaurant_menu_api::{
    dto::auth::LoginRequest,
    entity::Users,
    error::AppError,
    middleware::auth::ADMIN_ROLE,
    services::auth_service::{ensure_admin_account, login_user},
};
use sea_orm::{EntityTrait, PaginatorTrait};

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn admin_seeding_is_idempotent() -> anyhow::Result<()> {
    let app = setup().await?;

    let first = ensure_admin_account(&app.state.orm, "admin", "Admin123!").await?;
    let second = ensure_admin_account(&app.state.orm, "admin", "Other456!").await?;

    assert_eq!(first.id, second.id);
    assert_eq!(first.role, ADMIN_ROLE);
    assert_eq!(Users::find().count(&app.state.orm).await?, 1);

    // the original password still works
    login_user(&app.state, login("admin", "Admin123!")).await?;
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_token() -> anyhow::Result<()> {
    let app = setup().await?;
    ensure_admin_account(&app.state.orm, "admin", "Admin123!").await?;

    let resp = login_user(&app.state, login("admin", "Admin123!")).await?;
    let token = resp.data.expect("token").token;
    assert!(token.starts_with("Bearer "));
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_rejected() -> anyhow::Result<()> {
    let app = setup().await?;
    ensure_admin_account(&app.state.orm, "admin", "Admin123!").await?;

    let err = login_user(&app.state, login("admin", "wrong")).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = login_user(&app.state, login("nobody", "Admin123!")).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}
