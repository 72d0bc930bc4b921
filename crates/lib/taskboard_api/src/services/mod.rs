//! Business logic behind the handlers.

pub mod auth;
pub mod cookies;
pub mod projects;
pub mod tasks;
pub mod users;
