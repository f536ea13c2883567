//! 应用服务

mod auth_service;

pub use auth_service::*;
