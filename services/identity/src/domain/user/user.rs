//! 用户实体

use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_auth_core::TokenSubject;
use warden_common::UserId;

use crate::domain::value_objects::{Email, HashedPassword};

/// 用户实体
///
/// `is_admin` 为有效管理员标志：创建时的自举标志或任一授权记录
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub password_hash: HashedPassword,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 签发访问令牌用的主体信息
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.id,
            email: self.email.to_string(),
            display_name: self.display_name.clone(),
            is_admin: self.is_admin,
        }
    }

    /// 对外视图，不含密码哈希
    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.to_string(),
            display_name: self.display_name.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// 待创建的用户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub display_name: String,
    pub password_hash: HashedPassword,
}

/// 用户对外视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
