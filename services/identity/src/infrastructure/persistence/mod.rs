//! PostgreSQL 持久化

mod migrations;
mod postgres_admin_grant_repository;
mod postgres_user_repository;

pub use migrations::*;
pub use postgres_admin_grant_repository::*;
pub use postgres_user_repository::*;
