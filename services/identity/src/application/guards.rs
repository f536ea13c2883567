//! 授权检查
//!
//! 每个操作声明一个 `Requirement`，按顺序执行守卫链；
//! 未登录（401）与权限不足（403）始终是两种错误

use crate::application::context::RequestContext;
use crate::domain::auth::CurrentUser;
use crate::error::{AuthError, AuthResult};

/// 操作所需的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    RequiresLogin,
    RequiresAdmin,
}

pub type Guard = fn(Requirement, &RequestContext) -> AuthResult<()>;

/// 守卫链，顺序即检查顺序
pub const GUARD_CHAIN: &[Guard] = &[login_guard, admin_guard];

/// 非公开操作要求已登录
pub fn login_guard(requirement: Requirement, ctx: &RequestContext) -> AuthResult<()> {
    match requirement {
        Requirement::Public => Ok(()),
        _ if ctx.is_authenticated() => Ok(()),
        _ => Err(AuthError::LoginRequired),
    }
}

/// 管理员操作要求管理员身份
pub fn admin_guard(requirement: Requirement, ctx: &RequestContext) -> AuthResult<()> {
    if requirement == Requirement::RequiresAdmin && !ctx.is_admin() {
        return Err(AuthError::AdminRequired);
    }
    Ok(())
}

/// 依次执行守卫链
pub fn authorize(requirement: Requirement, ctx: &RequestContext) -> AuthResult<()> {
    GUARD_CHAIN
        .iter()
        .try_for_each(|guard| guard(requirement, ctx))
}

/// 取出已登录用户
pub fn require_user(ctx: &RequestContext) -> AuthResult<&CurrentUser> {
    ctx.current_user().ok_or(AuthError::LoginRequired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_common::UserId;

    fn ctx(is_admin: Option<bool>) -> RequestContext {
        RequestContext::from_identity(is_admin.map(|is_admin| CurrentUser {
            id: UserId::new(1),
            display_name: "A".to_string(),
            is_admin,
            token: "t".to_string(),
        }))
    }

    #[test]
    fn test_public_allows_anonymous() {
        assert!(authorize(Requirement::Public, &ctx(None)).is_ok());
    }

    #[test]
    fn test_login_required() {
        assert!(matches!(
            authorize(Requirement::RequiresLogin, &ctx(None)),
            Err(AuthError::LoginRequired)
        ));
        assert!(authorize(Requirement::RequiresLogin, &ctx(Some(false))).is_ok());
    }

    #[test]
    fn test_admin_required_distinguishes_anonymous_from_non_admin() {
        assert!(matches!(
            authorize(Requirement::RequiresAdmin, &ctx(None)),
            Err(AuthError::LoginRequired)
        ));
        assert!(matches!(
            authorize(Requirement::RequiresAdmin, &ctx(Some(false))),
            Err(AuthError::AdminRequired)
        ));
        assert!(authorize(Requirement::RequiresAdmin, &ctx(Some(true))).is_ok());
    }

    #[test]
    fn test_require_user() {
        assert!(require_user(&ctx(None)).is_err());
        assert_eq!(require_user(&ctx(Some(true))).unwrap().id, UserId::new(1));
    }
}
