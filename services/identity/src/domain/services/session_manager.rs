//! 会话管理器
//!
//! 会话生命周期：absent -> active（创建）-> active（续期，滑动窗口）-> absent（撤销或过期）。
//! 令牌本体从不轮换，续期只重置 TTL。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use warden_common::UserId;
use warden_ports::CachePort;

use crate::domain::auth::{SessionKey, SessionToken};
use crate::error::{AuthError, AuthResult};

/// 会话策略
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// 存储键前缀
    pub key_prefix: String,
    /// 滑动窗口长度
    pub ttl: Duration,
}

impl SessionPolicy {
    pub fn new(key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            ttl,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new("user_refresh", Duration::from_secs(7 * 24 * 60 * 60))
    }
}

pub struct SessionManager {
    store: Arc<dyn CachePort>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CachePort>, policy: SessionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    fn key(&self, user_id: UserId, token: &SessionToken) -> SessionKey {
        SessionKey::new(&self.policy.key_prefix, user_id, token)
    }

    /// 创建新会话，同一用户可同时持有多个会话
    pub async fn create_session(&self, user_id: UserId) -> AuthResult<SessionToken> {
        let token = SessionToken::generate();
        let key = self.key(user_id, &token);

        self.store
            .set(key.as_str(), token.as_str(), Some(self.policy.ttl))
            .await?;

        metrics::counter!("warden_session_created_total").increment(1);
        debug!(user_id = %user_id, "Session created");
        Ok(token)
    }

    /// 校验并续期会话
    pub async fn renew_session(&self, user_id: UserId, raw_token: &str) -> AuthResult<()> {
        let Some(token) = SessionToken::parse(raw_token) else {
            debug!(user_id = %user_id, "Malformed refresh token");
            return Err(AuthError::SessionNotFound);
        };
        let key = self.key(user_id, &token);

        let stored = self
            .store
            .get(key.as_str())
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if stored != token.as_str() {
            warn!(user_id = %user_id, "Stored session value does not match its key");
            return Err(AuthError::SessionTampered);
        }

        // 读取与续期之间会话可能已被撤销，EXPIRE 不会重建已删除的键
        if !self.store.expire(key.as_str(), self.policy.ttl).await? {
            debug!(user_id = %user_id, "Session revoked during renewal");
            return Err(AuthError::SessionNotFound);
        }

        metrics::counter!("warden_session_renewed_total").increment(1);
        debug!(user_id = %user_id, "Session renewed");
        Ok(())
    }

    /// 撤销会话，返回是否真的删除了会话；重复撤销返回 false
    pub async fn revoke_session(&self, user_id: UserId, raw_token: &str) -> AuthResult<bool> {
        let Some(token) = SessionToken::parse(raw_token) else {
            return Ok(false);
        };

        let removed = self.store.delete(self.key(user_id, &token).as_str()).await?;
        if removed {
            metrics::counter!("warden_session_revoked_total").increment(1);
            debug!(user_id = %user_id, "Session revoked");
        }
        Ok(removed)
    }
}
