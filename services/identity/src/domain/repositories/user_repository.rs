//! 用户 Repository trait

use async_trait::async_trait;
use warden_common::UserId;
use warden_errors::AppResult;

use crate::domain::user::{NewUser, User};
use crate::domain::value_objects::Email;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// 根据邮箱查找用户（大小写敏感）
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    /// 创建用户
    ///
    /// `claim_admin` 为真时在同一事务内尝试写入自举管理员授权；
    /// 授权已被他人领取则用户以普通身份创建。邮箱重复返回 `AppError::Conflict`
    async fn create(&self, new_user: &NewUser, claim_admin: bool) -> AppResult<User>;
}
