//! REST client integration tests
//!
//! Run with: cargo test -p integration-tests --test api_tests

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bot_api::{ApiClient, ApiError, MessageToCreate};
use bot_token::TokenSource;
use integration_tests::StaticToken;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct Seen {
    authorization: Mutex<Option<String>>,
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> ApiClient {
    let token: Arc<dyn TokenSource> = Arc::new(StaticToken);
    ApiClient::new(token).with_base_url(base_url)
}

#[tokio::test]
async fn test_gateway_bot_fetches_info() {
    let seen = Arc::new(Seen::default());
    let app = Router::new()
        .route(
            "/gateway/bot",
            get(|State(seen): State<Arc<Seen>>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                *seen.authorization.lock().await = auth;
                Json(json!({
                    "url": "wss://gateway.example",
                    "shards": 4,
                    "session_start_limit": {
                        "total": 1000,
                        "remaining": 996,
                        "reset_after": 14_400_000,
                        "max_concurrency": 2
                    }
                }))
            }),
        )
        .with_state(seen.clone());
    let base_url = serve(app).await;

    let info = client(&base_url).gateway_bot().await.unwrap();
    assert_eq!(info.shards, 4);
    assert_eq!(info.session_start_limit.max_concurrency, 2);

    // The credential was presented as-is
    let auth = seen.authorization.lock().await.clone();
    assert_eq!(auth.as_deref(), Some("Bot test-token"));
}

#[tokio::test]
async fn test_post_message() {
    let app = Router::new().route(
        "/channels/:channel_id/messages",
        post(
            |Path(channel_id): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(body["content"], "pong");
                assert_eq!(body["msg_id"], "m42");
                Json(json!({
                    "id": "m43",
                    "channel_id": channel_id,
                    "content": "pong"
                }))
            },
        ),
    );
    let base_url = serve(app).await;

    let message = client(&base_url)
        .post_message("c7", &MessageToCreate::reply("m42", "pong"))
        .await
        .unwrap();
    assert_eq!(message.id, "m43");
    assert_eq!(message.channel_id, "c7");
}

#[tokio::test]
async fn test_error_status_classification() {
    let app = Router::new().route(
        "/users/@me",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                [("x-tps-trace-id", "trace-abc")],
                Json(json!({ "code": 11244, "message": "token expired" })),
            )
        }),
    );
    let base_url = serve(app).await;

    let err = client(&base_url).me().await.unwrap_err();
    match &err {
        ApiError::Status {
            status,
            code,
            message,
            trace_id,
        } => {
            assert_eq!(*status, 401);
            assert_eq!(*code, 11244);
            assert_eq!(message, "token expired");
            assert_eq!(trace_id, "trace-abc");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    assert!(err.is_client_error());
    assert!(!err.is_server_error());
    assert_eq!(err.trace_id(), Some("trace-abc"));
}

#[tokio::test]
async fn test_create_and_post_direct_message() {
    let app = Router::new()
        .route(
            "/users/@me/dms",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["recipient_id"], "u5");
                assert_eq!(body["source_guild_id"], "g1");
                Json(json!({
                    "guild_id": "dm-g9",
                    "channel_id": "dm-c9",
                    "create_time": "2024-01-01T00:00:00Z"
                }))
            }),
        )
        .route(
            "/dms/:guild_id/messages",
            post(|Path(guild_id): Path<String>, Json(_): Json<Value>| async move {
                Json(json!({ "id": "dm-m1", "guild_id": guild_id, "direct_message": true }))
            }),
        );
    let base_url = serve(app).await;
    let api = client(&base_url);

    let session = api
        .create_direct_message(&bot_api::CreateDirectMessage {
            recipient_id: "u5".to_string(),
            source_guild_id: "g1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.guild_id, "dm-g9");

    let message = api
        .post_direct_message(&session.guild_id, &MessageToCreate::text("hi"))
        .await
        .unwrap();
    assert_eq!(message.id, "dm-m1");
    assert!(message.direct_message);
}
