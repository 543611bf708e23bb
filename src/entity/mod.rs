pub mod dish_images;
pub mod dishes;
pub mod ratings;
pub mod users;

pub use dish_images::Entity as DishImages;
pub use dishes::Entity as Dishes;
pub use ratings::Entity as Ratings;
pub use users::Entity as Users;
