//! warden-identity - 会话与令牌签发服务
//!
//! 分层：
//! - `domain`: 用户、会话、值对象、仓储接口、领域服务
//! - `application`: 认证编排、请求上下文、授权守卫
//! - `infrastructure`: PostgreSQL 仓储与迁移
//! - `api`: axum HTTP 接口

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
