pub mod auth_service;
pub mod dish_service;
