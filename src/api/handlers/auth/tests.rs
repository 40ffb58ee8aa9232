//! Session engine tests covering the rotation state machine.

use secrecy::SecretString;
use std::sync::Arc;

use super::engine::{AuthFlowError, SessionEngine};
use super::store::{RefreshSession, memory::MemoryAdminStore};
use super::tokens::TokenIssuer;
use super::utils::hash_token_id;

const EMAIL: &str = "admin@folio.dev";
const PASSWORD: &str = "correct horse battery staple";

fn issuer() -> TokenIssuer {
    TokenIssuer::new(
        SecretString::from("access-secret".to_string()),
        SecretString::from("refresh-secret".to_string()),
        900,
        604_800,
    )
}

fn engine_with_admin() -> (SessionEngine, Arc<MemoryAdminStore>) {
    let store = Arc::new(MemoryAdminStore::with_admin(EMAIL, PASSWORD));
    (SessionEngine::new(store.clone(), issuer()), store)
}

fn jti_of(engine: &SessionEngine, refresh_token: &str) -> String {
    engine
        .issuer()
        .verify_refresh(refresh_token)
        .expect("refresh claims")
        .jti
}

#[tokio::test]
async fn login_issues_tokens_and_persists_session() {
    let (engine, store) = engine_with_admin();

    let triple = engine.login(EMAIL, PASSWORD).await.expect("login");
    assert!(!triple.access_token.is_empty());
    assert!(!triple.csrf_token.is_empty());

    let jti = jti_of(&engine, &triple.refresh_token);
    let session = store.session_of(EMAIL).expect("admin exists");
    assert!(session.matches(&hash_token_id(&jti)));
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let (engine, _store) = engine_with_admin();

    let wrong_password = engine.login(EMAIL, "nope").await;
    let unknown_email = engine.login("ghost@folio.dev", PASSWORD).await;
    let empty = engine.login("", "").await;

    for result in [wrong_password, unknown_email, empty] {
        assert!(matches!(result, Err(AuthFlowError::InvalidCredentials)));
    }
}

#[tokio::test]
async fn second_login_invalidates_first_session() {
    let (engine, _store) = engine_with_admin();

    let first = engine.login(EMAIL, PASSWORD).await.expect("first login");
    let _second = engine.login(EMAIL, PASSWORD).await.expect("second login");

    // The first refresh token no longer matches the stored marker; presenting
    // it counts as reuse and revokes the session.
    let result = engine.refresh(Some(&first.refresh_token)).await;
    assert!(matches!(result, Err(AuthFlowError::SessionRevoked)));
}

#[tokio::test]
async fn refresh_rotates_and_old_token_is_single_use() {
    let (engine, store) = engine_with_admin();

    let original = engine.login(EMAIL, PASSWORD).await.expect("login");
    let rotated = engine
        .refresh(Some(&original.refresh_token))
        .await
        .expect("first refresh");

    assert_ne!(
        jti_of(&engine, &original.refresh_token),
        jti_of(&engine, &rotated.refresh_token)
    );

    // Replaying the rotated-out token is theft; the whole session goes,
    // including the freshly rotated token.
    let replay = engine.refresh(Some(&original.refresh_token)).await;
    assert!(matches!(replay, Err(AuthFlowError::SessionRevoked)));
    assert_eq!(store.session_of(EMAIL), Some(RefreshSession::None));

    let rotated_after_revoke = engine.refresh(Some(&rotated.refresh_token)).await;
    assert!(matches!(
        rotated_after_revoke,
        Err(AuthFlowError::InvalidSession)
    ));
}

#[tokio::test]
async fn refresh_without_token_or_with_garbage_fails() {
    let (engine, _store) = engine_with_admin();
    engine.login(EMAIL, PASSWORD).await.expect("login");

    assert!(matches!(
        engine.refresh(None).await,
        Err(AuthFlowError::NoSession)
    ));
    assert!(matches!(
        engine.refresh(Some("not-a-jwt")).await,
        Err(AuthFlowError::InvalidToken)
    ));
}

#[tokio::test]
async fn refresh_after_logout_is_invalid_session() {
    let (engine, store) = engine_with_admin();

    let triple = engine.login(EMAIL, PASSWORD).await.expect("login");
    engine.logout(Some(&triple.refresh_token)).await;
    assert_eq!(store.session_of(EMAIL), Some(RefreshSession::None));

    let result = engine.refresh(Some(&triple.refresh_token)).await;
    assert!(matches!(result, Err(AuthFlowError::InvalidSession)));
}

#[tokio::test]
async fn logout_is_idempotent_and_tolerates_garbage() {
    let (engine, store) = engine_with_admin();

    let triple = engine.login(EMAIL, PASSWORD).await.expect("login");
    engine.logout(Some(&triple.refresh_token)).await;
    engine.logout(Some(&triple.refresh_token)).await;
    engine.logout(Some("not-a-jwt")).await;
    engine.logout(None).await;

    assert_eq!(store.session_of(EMAIL), Some(RefreshSession::None));
}

#[tokio::test]
async fn logout_with_foreign_token_keeps_current_session() {
    let (engine, store) = engine_with_admin();

    let old = engine.login(EMAIL, PASSWORD).await.expect("first login");
    let current = engine.login(EMAIL, PASSWORD).await.expect("second login");

    // A stale token must not clear the newer session.
    engine.logout(Some(&old.refresh_token)).await;

    let jti = jti_of(&engine, &current.refresh_token);
    let session = store.session_of(EMAIL).expect("admin exists");
    assert!(session.matches(&hash_token_id(&jti)));
}

#[tokio::test]
async fn expired_refresh_token_is_invalid_not_revoking() {
    let store = Arc::new(MemoryAdminStore::with_admin(EMAIL, PASSWORD));
    let short_lived = TokenIssuer::new(
        SecretString::from("access-secret".to_string()),
        SecretString::from("refresh-secret".to_string()),
        900,
        -60,
    );
    let engine = SessionEngine::new(store.clone(), short_lived);

    let triple = engine.login(EMAIL, PASSWORD).await.expect("login");
    let result = engine.refresh(Some(&triple.refresh_token)).await;

    // Expiry fails signature-level validation before any reuse logic runs, so
    // the stored session survives.
    assert!(matches!(result, Err(AuthFlowError::InvalidToken)));
    assert_ne!(store.session_of(EMAIL), Some(RefreshSession::None));
}
