//! HTTP 接口（axum）

mod dto;
mod handlers;
mod middleware;
mod routes;
mod state;

pub use dto::*;
pub use middleware::{bearer_token, context_middleware, enforce};
pub use routes::router;
pub use state::*;
