//! 管理员授权 Repository trait

use async_trait::async_trait;
use warden_common::UserId;
use warden_errors::AppResult;

use crate::domain::user::AdminGrant;

#[async_trait]
pub trait AdminGrantRepository: Send + Sync {
    /// 最近一条授权记录
    async fn find_latest(&self) -> AppResult<Option<AdminGrant>>;

    /// 为用户写入一条授权记录
    async fn create(&self, user_id: UserId, granted_by: UserId) -> AppResult<AdminGrant>;
}
