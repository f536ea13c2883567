//! 请求上下文
//!
//! 每个请求解析一次身份，随请求传递给授权检查和处理函数

use crate::domain::auth::CurrentUser;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<CurrentUser>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: CurrentUser) -> Self {
        Self {
            identity: Some(user),
        }
    }

    pub fn from_identity(identity: Option<CurrentUser>) -> Self {
        Self { identity }
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|user| user.is_admin)
    }
}
