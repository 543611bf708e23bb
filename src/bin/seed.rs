use chrono::Utc;
use restaurant_menu_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::dishes::{ActiveModel as DishActive, Column as DishCol, Entity as Dishes},
    models::MealType,
    services::auth_service::ensure_admin_account,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin = ensure_admin_account(&orm, &config.admin_username, &config.admin_password).await?;
    seed_dishes(&orm).await?;

    println!("Seed completed. Admin: {} ({})", admin.username, admin.id);
    Ok(())
}

async fn seed_dishes(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let dishes = vec![
        ("Scrambled Eggs", "Three eggs with chives and rye toast", 2200, MealType::Breakfast),
        ("Tomato Soup", "Slow-cooked tomatoes with basil and cream", 1800, MealType::Lunch),
        ("Pierogi", "Dumplings with potato and cheese, a soup of the day on the side", 3200, MealType::Lunch),
        ("Grilled Trout", "Whole trout with lemon butter and seasonal vegetables", 5400, MealType::Dinner),
    ];

    for (name, description, price, category) in dishes {
        let exists = Dishes::find()
            .filter(DishCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        DishActive {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            category: Set(category),
            image_path: Set(None),
            version: Set(1),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded dishes");
    Ok(())
}
