//! 中间件
//!
//! `context_middleware` 为每个请求解析一次身份并放入请求扩展；
//! `enforce` 按路由声明的 `Requirement` 执行守卫链

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use warden_errors::AppError;

use crate::api::http::AppState;
use crate::application::context::RequestContext;
use crate::application::guards::{Requirement, authorize};

/// 从 `Authorization: Bearer <token>` 中取出令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 身份解析中间件
///
/// 令牌缺失或无效时放入匿名上下文，不拒绝请求
pub async fn context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).map(str::to_owned);

    let identity = match token {
        Some(token) => state.auth.resolve_identity(&token).await,
        None => None,
    };
    debug!(authenticated = identity.is_some(), "Request context resolved");

    request
        .extensions_mut()
        .insert(RequestContext::from_identity(identity));
    next.run(request).await
}

/// 授权中间件，通过 `route_layer` 挂在需要授权的路由上
pub async fn enforce(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    authorize(requirement, &ctx)?;
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
