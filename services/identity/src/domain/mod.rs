//! 领域层
//!
//! 实体、值对象、仓储接口和领域服务

pub mod auth;
pub mod repositories;
pub mod services;
pub mod user;
pub mod value_objects;
