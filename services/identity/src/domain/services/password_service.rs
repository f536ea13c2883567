//! 密码服务

use std::sync::LazyLock;

use tracing::error;
use warden_errors::AppError;

use crate::domain::value_objects::{HashedPassword, PasswordError};
use crate::error::{AuthError, AuthResult};

/// 未知账户登录时用于对齐耗时的哈希
static DUMMY_HASH: LazyLock<Option<HashedPassword>> = LazyLock::new(|| {
    HashedPassword::from_plain("warden-dummy-password")
        .map_err(|e| error!(error = %e, "Failed to prepare dummy password hash"))
        .ok()
});

/// 密码服务
pub struct PasswordService;

impl PasswordService {
    /// 哈希密码
    pub fn hash_password(password: &str) -> AuthResult<HashedPassword> {
        HashedPassword::from_plain(password).map_err(|e| match e {
            PasswordError::Empty => AuthError::Validation(e.to_string()),
            PasswordError::HashingFailed(msg) => AppError::internal(msg).into(),
        })
    }

    /// 验证密码，不匹配返回 false
    pub fn verify_password(password: &str, hash: &HashedPassword) -> bool {
        hash.verify(password)
    }

    /// 对不存在的账户执行一次同等代价的校验，结果总是 false
    pub fn verify_against_dummy(password: &str) -> bool {
        if let Some(hash) = DUMMY_HASH.as_ref() {
            std::hint::black_box(hash.verify(std::hint::black_box(password)));
        }
        false
    }
}
