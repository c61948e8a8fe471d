//! Gateway integration tests
//!
//! Drive real connections against an in-process scripted gateway: the
//! server side of every exchange is written out frame by frame in the test
//! body.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use bot_core::Intent;
use bot_gateway::{
    Connection, GatewayError, Handler, HandlerRegistry, Session, SessionManager, ShardConfig,
};
use bot_token::TokenSource;
use integration_tests::{gateway_info, MockGateway, StaticToken};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn spawn_manager(
    registry: Arc<HandlerRegistry>,
    info: bot_core::GatewayInfo,
    intent: Intent,
) {
    let manager = SessionManager::new(registry);
    let token: Arc<dyn TokenSource> = Arc::new(StaticToken);
    tokio::spawn(async move {
        let _ = manager.start(&info, token, intent).await;
    });
}

async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}

// ============================================================================
// Connection-level tests
// ============================================================================

#[tokio::test]
async fn test_connection_tracks_sequence_and_session() {
    let gateway = MockGateway::start().await.unwrap();
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.next_conn().await.unwrap();

        let identify = conn.expect_op(2).await.unwrap();
        assert_eq!(identify["d"]["token"], "Bot test-token");
        assert_eq!(identify["d"]["shard"], json!([0, 1]));

        conn.hello(200).await.unwrap();
        conn.ready("sess-1", [0, 1]).await.unwrap();
        conn.dispatch(2, "MESSAGE_CREATE", json!({"id": "m1", "content": "a"}))
            .await
            .unwrap();
        conn.dispatch(5, "MESSAGE_CREATE", json!({"id": "m2", "content": "b"}))
            .await
            .unwrap();
        conn.dispatch(9, "MESSAGE_CREATE", json!({"id": "m3", "content": "c"}))
            .await
            .unwrap();

        // The heartbeat carries the last seen sequence once dispatches have
        // been processed
        loop {
            let heartbeat = conn.expect_op(1).await.unwrap();
            if heartbeat["d"] == 9 {
                break;
            }
        }

        conn.close_with(4009, "session timed out").await.unwrap();
    });

    let session = Session::new(url, Intent::GUILD_MESSAGES, ShardConfig::default());
    let mut conn = Connection::new(
        session,
        Arc::new(HandlerRegistry::new()),
        Arc::new(StaticToken),
    );
    conn.connect().await.unwrap();
    conn.identify().await.unwrap();

    let err = conn.listening().await.unwrap_err();
    match &err {
        GatewayError::Closed { code, .. } => assert_eq!(*code, Some(4009)),
        other => panic!("expected Closed, got {other:?}"),
    }
    assert!(err.is_resumable());

    // Session state captured from the stream
    assert_eq!(conn.session().id, "sess-1");
    assert_eq!(conn.session().last_seq, 9);
    assert_eq!(conn.user().unwrap().username, "testbot");

    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_routes_events_to_handlers() {
    let gateway = MockGateway::start().await.unwrap();
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.next_conn().await.unwrap();
        conn.expect_op(2).await.unwrap();
        conn.hello(45_000).await.unwrap();
        conn.ready("sess-1", [0, 1]).await.unwrap();
        conn.dispatch(2, "MESSAGE_CREATE", json!({"id": "m1", "content": "hello"}))
            .await
            .unwrap();
        conn.dispatch(3, "SOME_FUTURE_EVENT", json!({"anything": true}))
            .await
            .unwrap();
        // Give the client time to dispatch before tearing down
        tokio::time::sleep(Duration::from_millis(300)).await;
        conn.close_with(4000, "done").await.unwrap();
    });

    let messages = Arc::new(AtomicUsize::new(0));
    let passthrough = Arc::new(AtomicUsize::new(0));
    let messages_seen = messages.clone();
    let passthrough_seen = passthrough.clone();

    let mut registry = HandlerRegistry::new();
    let intent = registry.register([
        Handler::message(move |event, message| {
            assert_eq!(event.seq, 2);
            assert_eq!(message.content, "hello");
            messages_seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        Handler::plain(move |event| {
            assert_eq!(event.raw_type, "SOME_FUTURE_EVENT");
            passthrough_seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    ]);
    assert_eq!(intent, Intent::GUILD_MESSAGES);

    let session = Session::new(url, intent, ShardConfig::default());
    let mut conn = Connection::new(session, Arc::new(registry), Arc::new(StaticToken));
    conn.connect().await.unwrap();
    conn.identify().await.unwrap();
    let _ = conn.listening().await;

    assert_eq!(messages.load(Ordering::SeqCst), 1);
    assert_eq!(passthrough.load(Ordering::SeqCst), 1);

    server.await.unwrap();
}

// ============================================================================
// Session manager tests
// ============================================================================

#[tokio::test]
async fn test_reconnect_triggers_resume() {
    let gateway = MockGateway::start().await.unwrap();
    let info = gateway_info(&gateway.url(), 1, 100, 5);
    spawn_manager(Arc::new(HandlerRegistry::new()), info, Intent::GUILDS);

    // First connection: identify, stream a dispatch, then ask for reconnect
    let mut first = gateway.next_conn().await.unwrap();
    let identify = first.expect_op(2).await.unwrap();
    assert_eq!(identify["d"]["shard"], json!([0, 1]));
    first.hello(45_000).await.unwrap();
    first.ready("sess-1", [0, 1]).await.unwrap();
    first
        .dispatch(5, "GUILD_CREATE", json!({"id": "g1"}))
        .await
        .unwrap();
    first.send_json(&json!({"op": 7})).await.unwrap();

    // Restart must resume with the retained session id and sequence
    let mut second = gateway.next_conn().await.unwrap();
    let resume = second.recv_json().await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-1");
    assert_eq!(resume["d"]["seq"], 5);
}

#[tokio::test]
async fn test_invalid_session_clears_and_identifies() {
    let gateway = MockGateway::start().await.unwrap();
    let info = gateway_info(&gateway.url(), 1, 100, 5);
    spawn_manager(Arc::new(HandlerRegistry::new()), info, Intent::GUILDS);

    let mut first = gateway.next_conn().await.unwrap();
    first.expect_op(2).await.unwrap();
    first.hello(45_000).await.unwrap();
    first.ready("sess-9", [0, 1]).await.unwrap();
    first
        .dispatch(3, "GUILD_CREATE", json!({"id": "g1"}))
        .await
        .unwrap();
    first.send_json(&json!({"op": 9})).await.unwrap();

    // The cleared session must identify fresh, never resume
    let mut second = gateway.next_conn().await.unwrap();
    let auth = second.recv_json().await.unwrap();
    assert_eq!(auth["op"], 2);
    assert!(auth["d"]["session_id"].is_null());
    assert_eq!(auth["d"]["shard"], json!([0, 1]));
}

#[tokio::test]
async fn test_callback_panic_restarts_only_offending_shard() {
    let gateway = MockGateway::start().await.unwrap();

    let delivered = Arc::new(AtomicUsize::new(0));
    let delivered_seen = delivered.clone();
    let mut registry = HandlerRegistry::new();
    let intent = registry.register([Handler::message(move |_, message| {
        assert!(message.content != "boom", "handler exploded on purpose");
        delivered_seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })]);

    let info = gateway_info(&gateway.url(), 2, 100, 5);
    spawn_manager(Arc::new(registry), info, intent);

    let mut shard0 = gateway.next_conn().await.unwrap();
    let identify0 = shard0.expect_op(2).await.unwrap();
    assert_eq!(identify0["d"]["shard"], json!([0, 2]));
    shard0.hello(45_000).await.unwrap();
    shard0.ready("sess-0", [0, 2]).await.unwrap();

    let mut shard1 = gateway.next_conn().await.unwrap();
    let identify1 = shard1.expect_op(2).await.unwrap();
    assert_eq!(identify1["d"]["shard"], json!([1, 2]));
    shard1.hello(45_000).await.unwrap();
    shard1.ready("sess-1", [1, 2]).await.unwrap();

    // Blow up the shard 0 callback
    shard0
        .dispatch(2, "MESSAGE_CREATE", json!({"id": "m1", "content": "boom"}))
        .await
        .unwrap();

    // Shard 0 comes back with a resume; the panic is not a session fault
    let mut shard0_restarted = gateway.next_conn().await.unwrap();
    let resume = shard0_restarted.recv_json().await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], "sess-0");

    // Shard 1 never noticed: it still receives and handles events
    shard1
        .dispatch(2, "MESSAGE_CREATE", json!({"id": "m2", "content": "fine"}))
        .await
        .unwrap();
    let delivered_ok =
        wait_until(Duration::from_secs(2), || delivered.load(Ordering::SeqCst) == 1).await;
    assert!(delivered_ok, "shard 1 never received its event");
    assert_eq!(gateway.accepted(), 3);
}

#[tokio::test]
async fn test_session_limit_opens_no_connections() {
    let gateway = MockGateway::start().await.unwrap();
    let info = gateway_info(&gateway.url(), 8, 4, 1);

    let manager = SessionManager::new(Arc::new(HandlerRegistry::new()));
    let token: Arc<dyn TokenSource> = Arc::new(StaticToken);
    let err = manager.start(&info, token, Intent::GUILDS).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::SessionLimitExceeded {
            shards: 8,
            remaining: 4
        }
    ));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(gateway.accepted(), 0);
}
