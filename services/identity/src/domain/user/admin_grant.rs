//! 管理员授权记录

use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_common::UserId;

/// 管理员授权
///
/// `granted_by` 为空且 `is_bootstrap` 为真的记录是首个注册用户的自举授权，
/// 全局至多一条。被授权用户删除后记录保留，`user_id` 置空，
/// 自举授权因此不会被再次领取
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminGrant {
    pub id: i64,
    pub user_id: Option<UserId>,
    pub granted_by: Option<UserId>,
    pub is_bootstrap: bool,
    pub created_at: DateTime<Utc>,
}
