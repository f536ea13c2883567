//! 服务错误定义

use thiserror::Error;
use tracing::error;
use warden_auth_core::TokenError;
use warden_errors::AppError;

/// 认证领域错误
///
/// 变体保留完整语义供日志区分；转换为 `AppError` 时按对外口径合并
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session value does not match its key")]
    SessionTampered,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Login required")]
    LoginRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Infrastructure(#[from] AppError),
}

impl AuthError {
    /// 是否属于“请重新登录”的会话错误
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionNotFound | Self::SessionTampered)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid(_) => Self::TokenInvalid,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::unauthorized("Invalid credentials"),
            AuthError::EmailAlreadyRegistered => AppError::conflict("Email already registered"),
            AuthError::SessionNotFound | AuthError::SessionTampered => {
                AppError::unauthorized("Session expired. Please log in again")
            }
            AuthError::TokenInvalid | AuthError::TokenExpired => {
                AppError::unauthenticated("Invalid or expired token")
            }
            AuthError::LoginRequired => AppError::unauthorized("Login required"),
            AuthError::AdminRequired => AppError::forbidden("Admin access required"),
            AuthError::Validation(msg) => AppError::validation(msg),
            AuthError::Infrastructure(e) => {
                if e.is_infrastructure() {
                    error!(error = %e, "Request failed on infrastructure error");
                }
                e
            }
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
