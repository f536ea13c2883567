//! 认证流程测试

mod common;

use std::sync::Arc;

use common::{ISSUER, SECRET, harness};
use warden_auth_core::{TokenService, TokenSubject};
use warden_common::UserId;
use warden_errors::AppError;
use warden_identity::domain::auth::CurrentUser;
use warden_identity::error::AuthError;

#[tokio::test]
async fn test_first_registrant_becomes_admin_only_once() {
    let h = harness();

    let a = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    let b = h.auth.register("b@x.com", "pw", "B").await.unwrap();

    assert!(a.is_admin);
    assert!(!b.is_admin);

    let grants = h.store.grants();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].user_id, Some(a.id));
    assert!(grants[0].is_bootstrap);
    assert_eq!(grants[0].granted_by, None);
}

#[tokio::test]
async fn test_concurrent_first_registrations_yield_one_admin() {
    let h = harness();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = h.auth.clone();
            tokio::spawn(async move {
                auth.register(&format!("user{}@x.com", i), "pw", "U")
                    .await
                    .unwrap()
            })
        })
        .collect();

    let users: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(users.len(), 8);
    assert_eq!(users.iter().filter(|u| u.is_admin).count(), 1);
    assert_eq!(h.store.grants().iter().filter(|g| g.is_bootstrap).count(), 1);
}

#[tokio::test]
async fn test_bootstrap_is_not_reclaimed_after_admin_deletion() {
    let h = harness();
    let a = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    assert!(a.is_admin);

    h.store.delete_user(a.id);

    let c = h.auth.register("c@x.com", "pw", "C").await.unwrap();
    assert!(!c.is_admin);

    let grants = h.store.grants();
    assert_eq!(grants.len(), 1);
    assert!(grants[0].is_bootstrap);
    assert_eq!(grants[0].user_id, None);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let h = harness();
    h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let err = h.auth.register("a@x.com", "other", "A2").await.unwrap_err();
    assert!(matches!(err, AuthError::EmailAlreadyRegistered));
    assert_eq!(AppError::from(err).status_code(), 409);
}

#[tokio::test]
async fn test_email_comparison_is_case_sensitive() {
    let h = harness();
    h.auth.register("a@x.com", "pw", "A").await.unwrap();

    h.auth.register("A@x.com", "pw", "A upper").await.unwrap();
    assert!(matches!(
        h.auth.login("A@X.COM", "pw").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_register_validates_input() {
    let h = harness();

    for (email, password, name) in [
        ("not-an-email", "pw", "A"),
        ("a@x.com", "", "A"),
        ("a@x.com", "pw", "   "),
    ] {
        assert!(matches!(
            h.auth.register(email, password, name).await,
            Err(AuthError::Validation(_))
        ));
    }
    assert!(h.store.grants().is_empty());
}

#[tokio::test]
async fn test_login_then_resolve_identity() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let pair = h.auth.login("a@x.com", "pw").await.unwrap();
    assert_eq!(pair.user_id, user.id);
    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, 900);

    let identity = h.auth.resolve_identity(&pair.access_token).await.unwrap();
    assert_eq!(identity.id, user.id);
    assert_eq!(identity.display_name, "A");
    assert!(identity.is_admin);
    assert_eq!(identity.token, pair.access_token);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
    let h = harness();
    h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let wrong_password = h.auth.login("a@x.com", "nope").await.unwrap_err();
    let unknown_email = h.auth.login("ghost@x.com", "pw").await.unwrap_err();
    let malformed_email = h.auth.login("ghost", "pw").await.unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert!(matches!(malformed_email, AuthError::InvalidCredentials));

    assert_eq!(
        AppError::from(wrong_password).to_string(),
        AppError::from(unknown_email).to_string()
    );
}

#[tokio::test]
async fn test_each_login_creates_a_separate_session() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let first = h.auth.login("a@x.com", "pw").await.unwrap();
    let second = h.auth.login("a@x.com", "pw").await.unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    assert!(h.auth.logout(user.id, &first.refresh_token).await.unwrap());
    h.auth
        .refresh_access_token(user.id, &second.refresh_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_worked_example() {
    let h = harness();

    let a = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    assert!(a.is_admin);
    let b = h.auth.register("b@x.com", "pw", "B").await.unwrap();
    assert!(!b.is_admin);

    let pair = h.auth.login("a@x.com", "pw").await.unwrap();
    let t = pair.refresh_token.clone();

    let refreshed = h.auth.refresh_access_token(a.id, &t).await.unwrap();
    assert!(h.auth.resolve_identity(&refreshed.access_token).await.is_some());
    // 不轮换：同一个刷新令牌仍然有效
    h.auth.refresh_access_token(a.id, &t).await.unwrap();

    assert!(h.auth.logout(a.id, &t).await.unwrap());
    assert!(matches!(
        h.auth.refresh_access_token(a.id, &t).await,
        Err(AuthError::SessionNotFound)
    ));
}

#[tokio::test]
async fn test_logout_of_unknown_pair_returns_false() {
    let h = harness();
    assert!(!h.auth.logout(UserId::new(42), "whatever").await.unwrap());
    assert!(
        !h.auth
            .logout(UserId::new(42), &"0".repeat(64))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_refresh_reflects_current_user_record() {
    let h = harness();
    let admin = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    let user = h.auth.register("b@x.com", "pw", "B").await.unwrap();

    let pair = h.auth.login("b@x.com", "pw").await.unwrap();
    let before = h.auth.resolve_identity(&pair.access_token).await.unwrap();
    assert!(!before.is_admin);

    let acting = h
        .auth
        .resolve_identity(&h.auth.login("a@x.com", "pw").await.unwrap().access_token)
        .await
        .unwrap();
    assert_eq!(acting.id, admin.id);
    assert!(h.auth.grant_administrator(&acting, user.id).await.unwrap());

    // 已签发的访问令牌保持旧的管理员标志，刷新后才生效
    let stale = h.auth.resolve_identity(&pair.access_token).await.unwrap();
    assert!(!stale.is_admin);

    let refreshed = h
        .auth
        .refresh_access_token(user.id, &pair.refresh_token)
        .await
        .unwrap();
    let fresh = h.auth.resolve_identity(&refreshed.access_token).await.unwrap();
    assert!(fresh.is_admin);
}

#[tokio::test]
async fn test_refresh_for_deleted_user_revokes_session() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    let pair = h.auth.login("a@x.com", "pw").await.unwrap();

    h.store.delete_user(user.id);

    assert!(matches!(
        h.auth.refresh_access_token(user.id, &pair.refresh_token).await,
        Err(AuthError::SessionNotFound)
    ));
    assert!(h.cache.keys().is_empty());
}

#[tokio::test]
async fn test_resolve_identity_degrades_to_none() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();

    assert!(h.auth.resolve_identity("").await.is_none());
    assert!(h.auth.resolve_identity("garbage").await.is_none());

    let foreign = TokenService::new("some-other-secret-that-is-32-bytes!", 900, ISSUER);
    let forged = foreign
        .generate_access_token(&TokenSubject {
            user_id: user.id,
            email: "a@x.com".to_string(),
            display_name: "A".to_string(),
            is_admin: true,
        })
        .unwrap();
    assert!(h.auth.resolve_identity(&forged).await.is_none());

    let pair = h.auth.login("a@x.com", "pw").await.unwrap();
    h.store.delete_user(user.id);
    assert!(h.auth.resolve_identity(&pair.access_token).await.is_none());
}

#[tokio::test]
async fn test_zero_ttl_access_token_is_immediately_expired() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let zero_ttl = TokenService::new(SECRET, 0, ISSUER);
    let token = zero_ttl
        .generate_access_token(&TokenSubject {
            user_id: user.id,
            email: "a@x.com".to_string(),
            display_name: "A".to_string(),
            is_admin: true,
        })
        .unwrap();

    assert!(h.tokens.validate_access_token(&token).is_err());
    assert!(h.auth.resolve_identity(&token).await.is_none());
}

#[tokio::test]
async fn test_grant_to_missing_user_returns_false() {
    let h = harness();
    let admin = h.auth.register("a@x.com", "pw", "A").await.unwrap();
    let acting = CurrentUser {
        id: admin.id,
        display_name: "A".to_string(),
        is_admin: true,
        token: String::new(),
    };

    assert!(
        !h.auth
            .grant_administrator(&acting, UserId::new(999))
            .await
            .unwrap()
    );
    assert_eq!(h.store.grants().len(), 1);
}

#[tokio::test]
async fn test_user_lookups_hide_password_hash() {
    let h = harness();
    let user = h.auth.register("a@x.com", "pw", "A").await.unwrap();

    let by_id = h.auth.find_user_by_id(user.id).await.unwrap().unwrap();
    let by_email = h.auth.find_user_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(by_id, by_email);
    assert!(!serde_json::to_string(&by_id).unwrap().contains("argon2"));

    assert!(h.auth.find_user_by_id(UserId::new(99)).await.unwrap().is_none());
    assert!(matches!(
        h.auth.find_user_by_email("nope").await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn test_services_are_shareable_across_tasks() {
    let h = harness();
    let auth = Arc::clone(&h.auth);
    let handle = tokio::spawn(async move { auth.logout(UserId::new(1), "x").await });
    assert!(!handle.await.unwrap().unwrap());
}
