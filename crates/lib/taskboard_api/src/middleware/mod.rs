//! Request guards.

pub mod auth;
pub mod resource_id;
