//! Credential manager integration tests
//!
//! Run with: cargo test -p integration-tests --test token_tests

use bot_token::{ManagerState, TokenError, TokenManager};
use integration_tests::MockAuthority;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn manager_for(authority: &MockAuthority) -> Arc<TokenManager> {
    Arc::new(TokenManager::new("100001", "test-secret").with_auth_url(&authority.url))
}

#[tokio::test]
async fn test_concurrent_token_calls_coalesce() {
    // A slow authority widens the window where uncoalesced callers would
    // each fire their own fetch
    let authority = MockAuthority::start(json!("7200"), Duration::from_millis(200))
        .await
        .unwrap();
    let manager = manager_for(&authority);

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let manager = manager.clone();
        tasks.push(tokio::spawn(async move {
            manager.token().await.unwrap().access_token().to_string()
        }));
    }

    let mut tokens = Vec::new();
    for task in tasks {
        tokens.push(task.await.unwrap());
    }

    // Exactly one outbound fetch, every caller observing its result
    assert_eq!(authority.hits(), 1);
    assert!(tokens.iter().all(|token| token == "token-1"));
}

#[tokio::test]
async fn test_valid_token_is_reused() {
    let authority = MockAuthority::start(json!("7200"), Duration::ZERO).await.unwrap();
    let manager = manager_for(&authority);

    let first = manager.token().await.unwrap();
    let second = manager.token().await.unwrap();
    assert_eq!(first.access_token(), second.access_token());
    assert_eq!(authority.hits(), 1);
}

#[tokio::test]
async fn test_background_refresh_ahead_of_expiry() {
    // TTL of 31s leaves 1s after the 30s safety margin, clamped to the 2s
    // floor: the loop refreshes roughly every 2 seconds
    let authority = MockAuthority::start(json!("31"), Duration::ZERO).await.unwrap();
    let manager = manager_for(&authority);
    let cancel = CancellationToken::new();

    let started = manager.start_refresh(cancel.clone()).await.unwrap();
    assert!(started);
    assert_eq!(manager.state(), ManagerState::Working);
    assert_eq!(authority.hits(), 1);

    // A second start is a no-op
    assert!(!manager.start_refresh(cancel.clone()).await.unwrap());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(authority.hits() >= 2, "refresh loop never refetched");

    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(manager.state(), ManagerState::Stopped);
}

#[tokio::test]
async fn test_force_refresh_wakes_loop() {
    let authority = MockAuthority::start(json!(7200), Duration::ZERO).await.unwrap();
    let manager = manager_for(&authority);
    let cancel = CancellationToken::new();

    manager.start_refresh(cancel.clone()).await.unwrap();
    assert_eq!(authority.hits(), 1);

    assert!(manager.force_refresh("credential revoked upstream"));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(authority.hits(), 2);

    cancel.cancel();
}

#[tokio::test]
async fn test_first_fetch_failure_is_fatal_to_start() {
    let authority = MockAuthority::start_failing().await.unwrap();
    let manager = manager_for(&authority);

    let err = manager
        .start_refresh(CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        TokenError::Authority { code, .. } => assert_eq!(code, 100_007),
        other => panic!("expected Authority error, got {other:?}"),
    }
    assert_eq!(manager.state(), ManagerState::Uninitialized);

    // Direct calls surface the same failure
    assert!(manager.token().await.is_err());
}
