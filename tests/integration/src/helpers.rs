//! Test helpers
//!
//! A scripted gateway server driven from the test body frame by frame, and
//! a mock credential authority with a request counter.

use anyhow::{bail, Context, Result};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// How long helpers wait for an expected frame or connection
const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Mock gateway
// ============================================================================

/// An accepted server-side gateway socket, scripted by the test
pub struct ServerSocket {
    ws: WebSocketStream<TcpStream>,
}

impl ServerSocket {
    /// Send a raw JSON frame
    pub async fn send_json(&mut self, frame: &Value) -> Result<()> {
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Receive the next JSON frame, skipping non-text messages
    pub async fn recv_json(&mut self) -> Result<Value> {
        loop {
            let message = tokio::time::timeout(WAIT_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for a frame")?
                .context("connection closed while waiting for a frame")??;
            match message {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => bail!("peer closed the connection: {frame:?}"),
                _ => {}
            }
        }
    }

    /// Receive frames until one carries the given op code
    ///
    /// Skips heartbeats and other chatter arriving in between.
    pub async fn expect_op(&mut self, op: u64) -> Result<Value> {
        loop {
            let frame = self.recv_json().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Send the hello frame with the given heartbeat interval
    pub async fn hello(&mut self, heartbeat_interval_ms: u64) -> Result<()> {
        self.send_json(&json!({
            "op": 10,
            "d": { "heartbeat_interval": heartbeat_interval_ms }
        }))
        .await
    }

    /// Send the READY dispatch for a freshly identified session
    pub async fn ready(&mut self, session_id: &str, shard: [u32; 2]) -> Result<()> {
        self.send_json(&json!({
            "op": 0,
            "s": 1,
            "t": "READY",
            "d": {
                "version": 1,
                "session_id": session_id,
                "user": { "id": "bot-1", "username": "testbot", "bot": true },
                "shard": shard
            }
        }))
        .await
    }

    /// Send a dispatch frame
    pub async fn dispatch(&mut self, seq: u64, event_type: &str, data: Value) -> Result<()> {
        self.send_json(&json!({
            "op": 0,
            "s": seq,
            "t": event_type,
            "d": data
        }))
        .await
    }

    /// Close the connection with a gateway close code
    pub async fn close_with(&mut self, code: u16, reason: &str) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: WsCloseCode::from(code),
                reason: reason.to_string().into(),
            }))
            .await?;
        Ok(())
    }
}

/// In-process gateway server handing accepted connections to the test
pub struct MockGateway {
    pub addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    connections: Mutex<mpsc::UnboundedReceiver<ServerSocket>>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    /// Bind a listener and start accepting websocket connections
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let accepted = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();

        let counter = accepted.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                if tx.send(ServerSocket { ws }).is_err() {
                    return;
                }
            }
        });

        Ok(Self {
            addr,
            accepted,
            connections: Mutex::new(rx),
            _handle: handle,
        })
    }

    /// The websocket URL clients should dial
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Wait for the next accepted connection
    pub async fn next_conn(&self) -> Result<ServerSocket> {
        let mut rx = self.connections.lock().await;
        tokio::time::timeout(WAIT_TIMEOUT, rx.recv())
            .await
            .context("timed out waiting for a connection")?
            .context("gateway accept loop stopped")
    }

    /// Number of connections accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock credential authority
// ============================================================================

struct AuthorityState {
    hits: AtomicUsize,
    /// Response delay; widens the window in which concurrent fetches would
    /// pile up without coalescing
    delay: Duration,
    /// `expires_in` value to report, as raw JSON (string or number)
    expires_in: Value,
    /// Respond with a business error body instead of a token
    fail: bool,
}

/// Mock token authority counting every fetch
pub struct MockAuthority {
    pub url: String,
    state: Arc<AuthorityState>,
    _handle: JoinHandle<()>,
}

impl MockAuthority {
    /// Serve tokens with the given `expires_in` (string or number JSON)
    pub async fn start(expires_in: Value, delay: Duration) -> Result<Self> {
        Self::start_inner(expires_in, delay, false).await
    }

    /// Serve only business-error responses
    pub async fn start_failing() -> Result<Self> {
        Self::start_inner(json!("7200"), Duration::ZERO, true).await
    }

    async fn start_inner(expires_in: Value, delay: Duration, fail: bool) -> Result<Self> {
        let state = Arc::new(AuthorityState {
            hits: AtomicUsize::new(0),
            delay,
            expires_in,
            fail,
        });

        let app = Router::new()
            .route("/app/getAppAccessToken", post(issue_token))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            url: format!("http://{addr}/app/getAppAccessToken"),
            state,
            _handle: handle,
        })
    }

    /// Number of token fetches served
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

async fn issue_token(State(state): State<Arc<AuthorityState>>) -> Json<Value> {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    if state.fail {
        return Json(json!({ "code": 100007, "message": "appid invalid" }));
    }
    Json(json!({
        "code": 0,
        "message": "",
        "access_token": format!("token-{hit}"),
        "expires_in": state.expires_in.clone()
    }))
}
