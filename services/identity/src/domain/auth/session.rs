//! 会话（刷新令牌）
//!
//! 会话存储为 `prefix:userId:tokenBody -> tokenBody`，键的存在即会话有效

use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use warden_common::UserId;

/// 令牌随机字节数
pub const SESSION_TOKEN_BYTES: usize = 32;

/// 令牌字符串长度（十六进制）
pub const SESSION_TOKEN_LEN: usize = SESSION_TOKEN_BYTES * 2;

/// 会话令牌（刷新令牌本体）
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// 从操作系统随机源生成新令牌
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// 解析调用方提交的令牌
    ///
    /// 只接受小写十六进制且长度固定，令牌会拼进存储键，格式不符直接拒绝
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == SESSION_TOKEN_LEN
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// 会话存储键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(prefix: &str, user_id: UserId, token: &SessionToken) -> Self {
        Self(format!("{}:{}:{}", prefix, user_id, token.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
