//! 领域服务

mod password_service;
mod session_manager;

pub use password_service::*;
pub use session_manager::*;
