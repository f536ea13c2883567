//! warden-auth-core - 认证核心库
//!
//! 访问令牌（JWT, HS256）的签发与校验。访问令牌是无状态的，
//! 校验不访问任何存储；会话（刷新令牌）由 identity 服务管理。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use warden_common::UserId;
use warden_errors::{AppError, AppResult};

/// 令牌校验错误
///
/// 两种错误对调用方都表现为“未认证”，只在日志中区分
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token invalid: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::unauthenticated("Invalid or expired token")
    }
}

/// 令牌主体：签发时从用户记录实时派生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

/// JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// 有效期超出时间范围时返回错误
    pub fn new(subject: &TokenSubject, expires_in_secs: i64, issuer: &str) -> AppResult<Self> {
        let now = Utc::now();
        let exp = Duration::try_seconds(expires_in_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Access token lifetime out of range: {}s",
                    expires_in_secs
                ))
            })?;

        Ok(Self {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            display_name: subject.display_name.clone(),
            is_admin: subject.is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
        })
    }

    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))
    }
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &str, access_token_expires_in: i64, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            issuer: issuer.into(),
        }
    }

    /// 生成访问令牌（使用配置的有效期）
    pub fn generate_access_token(&self, subject: &TokenSubject) -> AppResult<String> {
        self.generate_access_token_with_ttl(subject, self.access_token_expires_in)
    }

    /// 生成指定有效期（秒）的访问令牌
    pub fn generate_access_token_with_ttl(
        &self,
        subject: &TokenSubject,
        expires_in_secs: i64,
    ) -> AppResult<String> {
        let claims = Claims::new(subject, expires_in_secs, &self.issuer)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 校验访问令牌
    ///
    /// `exp <= now` 即视为过期，不允许时间偏差，因此有效期为 0 的令牌立即失效
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        if claims.jti.is_empty() {
            return Err(TokenError::Invalid("Token ID (jti) missing".to_string()));
        }

        Ok(claims)
    }

    /// 获取访问令牌过期时间（秒）
    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}
