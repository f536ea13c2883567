//! 请求处理函数

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use warden_common::UserId;
use warden_errors::{AppError, AppResult};
use warden_telemetry::HealthStatus;

use crate::api::http::{
    AppState, EmailQuery, GrantAdminRequest, GrantAdminResponse, LoginRequest, LogoutResponse,
    RefreshResponse, RegisterRequest, SessionRequest,
};
use crate::application::context::RequestContext;
use crate::application::guards::require_user;
use crate::application::services::SessionPair;
use crate::domain::auth::CurrentUser;
use crate::domain::user::UserView;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = state
        .auth
        .register(&req.email, &req.password, &req.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(user.to_view())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<SessionPair>> {
    Ok(Json(state.auth.login(&req.email, &req.password).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let token = state
        .auth
        .refresh_access_token(req.user_id, &req.refresh_token)
        .await?;

    Ok(Json(RefreshResponse {
        access_token: token.access_token,
        refresh_token: req.refresh_token,
        expires_in: token.expires_in,
        token_type: token.token_type,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<LogoutResponse>> {
    let revoked = state.auth.logout(req.user_id, &req.refresh_token).await?;
    Ok(Json(LogoutResponse { revoked }))
}

/// 当前身份，未登录返回 `null`
pub async fn me(ctx: RequestContext) -> Json<Option<CurrentUser>> {
    Json(ctx.current_user().cloned())
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserView>> {
    state
        .auth
        .find_user_by_id(UserId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))
}

pub async fn find_user_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<UserView>> {
    state
        .auth
        .find_user_by_email(&query.email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn grant_admin(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<GrantAdminRequest>,
) -> AppResult<Json<GrantAdminResponse>> {
    let acting_user = require_user(&ctx)?;
    let granted = state
        .auth
        .grant_administrator(acting_user, req.user_id)
        .await?;
    Ok(Json(GrantAdminResponse { granted }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let status = state.health.check().await;
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
