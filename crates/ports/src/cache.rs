//! Cache trait 定义

use async_trait::async_trait;
use std::time::Duration;
use warden_errors::AppResult;

/// 带过期时间的键值存储
///
/// 过期的键与不存在的键不可区分，单键操作须是原子的
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值，不存在或已过期返回 `None`
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值，`ttl` 为 `None` 时永不过期
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存，返回是否真的删除了键
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 重置过期时间，键不存在时返回 `false` 且不创建键
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;
}
