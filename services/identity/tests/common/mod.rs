//! 测试共用的内存实现

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use warden_auth_core::TokenService;
use warden_common::UserId;
use warden_errors::{AppError, AppResult};
use warden_identity::api::http::HealthProbe;
use warden_identity::application::services::AuthService;
use warden_identity::domain::repositories::{AdminGrantRepository, UserRepository};
use warden_identity::domain::services::{SessionManager, SessionPolicy};
use warden_identity::domain::user::{AdminGrant, NewUser, User};
use warden_identity::domain::value_objects::Email;
use warden_ports::CachePort;
use warden_telemetry::HealthStatus;

pub const SECRET: &str = "integration-test-secret-32-bytes!!";
pub const ISSUER: &str = "warden";

/// 带过期时间的内存键值存储
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入，绕过会话管理器
    pub fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (value.to_string(), Some(Instant::now() + ttl)),
        );
    }

    /// 剩余有效期
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        let (_, expires_at) = entries.get(key)?;
        expires_at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (_, exp))| exp.is_none_or(|at| at > now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn live<'a>(
        entries: &'a mut HashMap<String, (String, Option<Instant>)>,
        key: &str,
    ) -> Option<&'a mut (String, Option<Instant>)> {
        let expired = matches!(entries.get(key), Some((_, Some(at))) if *at <= Instant::now());
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get_mut(key)
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        let present = Self::live(&mut entries, key).is_some();
        entries.remove(key);
        Ok(present)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        match Self::live(&mut entries, key) {
            Some(entry) => {
                entry.1 = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 总是失败的存储
pub struct UnavailableCache;

#[async_trait]
impl CachePort for UnavailableCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::external_service("Redis get failed: connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> AppResult<()> {
        Err(AppError::external_service("Redis set failed: connection refused"))
    }

    async fn delete(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::external_service("Redis delete failed: connection refused"))
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::external_service("Redis exists failed: connection refused"))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::external_service("Redis expire failed: connection refused"))
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    grants: Vec<AdminGrant>,
    last_user_id: i64,
}

/// 内存用户库，同时实现用户与授权两个仓储
///
/// 自举授权在同一把锁内检查并写入，等价于数据库的唯一索引
#[derive(Default)]
pub struct MemoryUserStore {
    tables: Mutex<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete_user(&self, id: UserId) {
        let mut tables = self.tables.lock().unwrap();
        tables.users.retain(|u| u.id != id);
        // 与外键 ON DELETE SET NULL 一致：授权记录保留
        for grant in tables.grants.iter_mut() {
            if grant.user_id == Some(id) {
                grant.user_id = None;
            }
            if grant.granted_by == Some(id) {
                grant.granted_by = None;
            }
        }
    }

    pub fn grants(&self) -> Vec<AdminGrant> {
        self.tables.lock().unwrap().grants.clone()
    }

    fn effective(tables: &Tables, user: &User) -> User {
        let mut user = user.clone();
        user.is_admin = user.is_admin || tables.grants.iter().any(|g| g.user_id == Some(user.id));
        user
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| Self::effective(&tables, u)))
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| &u.email == email)
            .map(|u| Self::effective(&tables, u)))
    }

    async fn create(&self, new_user: &NewUser, claim_admin: bool) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict("Duplicate entry violates unique constraint"));
        }

        tables.last_user_id += 1;
        let id = UserId::new(tables.last_user_id);
        let claimed = claim_admin && !tables.grants.iter().any(|g| g.is_bootstrap);
        if claimed {
            let grant_id = tables.grants.len() as i64 + 1;
            tables.grants.push(AdminGrant {
                id: grant_id,
                user_id: Some(id),
                granted_by: None,
                is_bootstrap: true,
                created_at: Utc::now(),
            });
        }

        let user = User {
            id,
            email: new_user.email.clone(),
            display_name: new_user.display_name.clone(),
            password_hash: new_user.password_hash.clone(),
            is_admin: claimed,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AdminGrantRepository for MemoryUserStore {
    async fn find_latest(&self) -> AppResult<Option<AdminGrant>> {
        Ok(self.tables.lock().unwrap().grants.last().cloned())
    }

    async fn create(&self, user_id: UserId, granted_by: UserId) -> AppResult<AdminGrant> {
        let mut tables = self.tables.lock().unwrap();
        let grant = AdminGrant {
            id: tables.grants.len() as i64 + 1,
            user_id: Some(user_id),
            granted_by: Some(granted_by),
            is_bootstrap: false,
            created_at: Utc::now(),
        };
        tables.grants.push(grant.clone());
        Ok(grant)
    }
}

/// 固定结果的健康检查
pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthProbe for StaticHealth {
    async fn check(&self) -> HealthStatus {
        let mut status = HealthStatus::new();
        status.add_check("redis", self.0, None);
        status
    }
}

pub struct Harness {
    pub auth: Arc<AuthService>,
    pub store: Arc<MemoryUserStore>,
    pub cache: Arc<MemoryCache>,
    pub tokens: Arc<TokenService>,
}

pub fn harness() -> Harness {
    harness_with_policy(SessionPolicy::default())
}

pub fn harness_with_policy(policy: SessionPolicy) -> Harness {
    let store = Arc::new(MemoryUserStore::new());
    let cache = Arc::new(MemoryCache::new());
    let tokens = Arc::new(TokenService::new(SECRET, 900, ISSUER));

    let auth = Arc::new(AuthService::new(
        store.clone(),
        store.clone(),
        SessionManager::new(cache.clone(), policy),
        tokens.clone(),
    ));

    Harness {
        auth,
        store,
        cache,
        tokens,
    }
}
