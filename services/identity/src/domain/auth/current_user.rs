//! 请求身份

use serde::Serialize;
use warden_common::UserId;

/// 当前请求的已解析身份
///
/// 由访问令牌校验得到，只在单个请求内有效
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub display_name: String,
    pub is_admin: bool,
    #[serde(skip)]
    pub token: String,
}
