//! 仓储接口

mod admin_grant_repository;
mod user_repository;

pub use admin_grant_repository::*;
pub use user_repository::*;
