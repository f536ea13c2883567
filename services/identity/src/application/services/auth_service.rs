//! 认证编排服务
//!
//! 组合密码校验、会话管理和访问令牌签发，对外提供登录、注册、刷新、登出、
//! 身份解析和管理员授权

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use warden_auth_core::TokenService;
use warden_common::UserId;
use warden_errors::AppError;

use crate::domain::auth::CurrentUser;
use crate::domain::repositories::{AdminGrantRepository, UserRepository};
use crate::domain::services::{PasswordService, SessionManager};
use crate::domain::user::{NewUser, User, UserView};
use crate::domain::value_objects::{Email, HashedPassword};
use crate::error::{AuthError, AuthResult};

/// 登录结果
#[derive(Debug, Clone, Serialize)]
pub struct SessionPair {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub expires_in: i64,
    pub token_type: String,
}

/// 刷新得到的访问令牌
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    grants: Arc<dyn AdminGrantRepository>,
    sessions: SessionManager,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        grants: Arc<dyn AdminGrantRepository>,
        sessions: SessionManager,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            grants,
            sessions,
            tokens,
        }
    }

    /// 注册
    ///
    /// 系统中尚无任何管理员授权时，本次注册尝试领取首个管理员身份
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AuthResult<User> {
        let email = Email::new(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AuthError::Validation(
                "Display name cannot be empty".to_string(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password = password.to_string();
        let password_hash =
            run_blocking(move || PasswordService::hash_password(&password)).await??;

        let claim_admin = self.grants.find_latest().await?.is_none();

        let new_user = NewUser {
            email,
            display_name: display_name.to_string(),
            password_hash,
        };
        let user = self
            .users
            .create(&new_user, claim_admin)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AuthError::EmailAlreadyRegistered,
                other => AuthError::Infrastructure(other),
            })?;

        metrics::counter!("warden_register_total", "admin" => user.is_admin.to_string())
            .increment(1);
        info!(user_id = %user.id, is_admin = user.is_admin, "User registered");
        Ok(user)
    }

    /// 登录
    ///
    /// 邮箱不存在与密码错误返回同一个错误
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<SessionPair> {
        let user = match Email::new(email) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash).await?,
            None => {
                let password = password.to_string();
                run_blocking(move || PasswordService::verify_against_dummy(&password)).await?
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                metrics::counter!("warden_login_total", "outcome" => "failure").increment(1);
                debug!("Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let refresh_token = self.sessions.create_session(user.id).await?;
        let access_token = self.tokens.generate_access_token(&user.token_subject())?;

        metrics::counter!("warden_login_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, "User logged in");

        Ok(SessionPair {
            access_token,
            refresh_token: refresh_token.into_inner(),
            user_id: user.id,
            expires_in: self.tokens.access_token_expires_in(),
            token_type: "Bearer".to_string(),
        })
    }

    /// 用刷新令牌换取新的访问令牌，刷新令牌本身不变
    pub async fn refresh_access_token(
        &self,
        user_id: UserId,
        refresh_token: &str,
    ) -> AuthResult<AccessToken> {
        self.sessions.renew_session(user_id, refresh_token).await?;

        let Some(user) = self.users.find_by_id(user_id).await? else {
            warn!(user_id = %user_id, "Session belongs to a missing user, revoking");
            self.sessions.revoke_session(user_id, refresh_token).await?;
            return Err(AuthError::SessionNotFound);
        };

        let access_token = self.tokens.generate_access_token(&user.token_subject())?;
        debug!(user_id = %user_id, "Access token refreshed");

        Ok(AccessToken {
            access_token,
            expires_in: self.tokens.access_token_expires_in(),
            token_type: "Bearer".to_string(),
        })
    }

    /// 登出，返回是否真的撤销了会话
    pub async fn logout(&self, user_id: UserId, refresh_token: &str) -> AuthResult<bool> {
        let revoked = self.sessions.revoke_session(user_id, refresh_token).await?;
        info!(user_id = %user_id, revoked, "User logged out");
        Ok(revoked)
    }

    /// 解析访问令牌对应的身份
    ///
    /// 不返回错误：任何失败都降级为无身份，由授权检查决定是否拒绝
    pub async fn resolve_identity(&self, access_token: &str) -> Option<CurrentUser> {
        let claims = match self.tokens.validate_access_token(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Access token rejected");
                return None;
            }
        };
        let user_id = claims.user_id().ok()?;

        match self.users.find_by_id(user_id).await {
            Ok(Some(_)) => Some(CurrentUser {
                id: user_id,
                display_name: claims.display_name,
                is_admin: claims.is_admin,
                token: access_token.to_string(),
            }),
            Ok(None) => {
                debug!(user_id = %user_id, "Token subject no longer exists");
                None
            }
            Err(e) => {
                warn!(error = %e, "Identity lookup failed");
                None
            }
        }
    }

    /// 授予管理员身份
    ///
    /// 调用方须已通过管理员守卫；目标用户不存在时返回 false
    pub async fn grant_administrator(
        &self,
        acting_user: &CurrentUser,
        target_user_id: UserId,
    ) -> AuthResult<bool> {
        if self.users.find_by_id(target_user_id).await?.is_none() {
            return Ok(false);
        }

        self.grants.create(target_user_id, acting_user.id).await?;
        info!(
            user_id = %target_user_id,
            granted_by = %acting_user.id,
            "Administrator granted"
        );
        Ok(true)
    }

    pub async fn find_user_by_id(&self, id: UserId) -> AuthResult<Option<UserView>> {
        Ok(self.users.find_by_id(id).await?.map(|user| user.to_view()))
    }

    pub async fn find_user_by_email(&self, email: &str) -> AuthResult<Option<UserView>> {
        let email = Email::new(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(self
            .users
            .find_by_email(&email)
            .await?
            .map(|user| user.to_view()))
    }
}

async fn verify_password(password: &str, hash: &HashedPassword) -> AuthResult<bool> {
    let password = password.to_string();
    let hash = hash.clone();
    run_blocking(move || PasswordService::verify_password(&password, &hash)).await
}

/// argon2 运算放到阻塞线程池，避免占用异步工作线程
async fn run_blocking<F, T>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            AuthError::Infrastructure(AppError::internal(format!("Password task failed: {}", e)))
        })
}
