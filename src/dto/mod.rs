pub mod auth;
pub mod dishes;
