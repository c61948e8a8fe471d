//! Gateway connection state machine
//!
//! One connection per shard. The wire-read loop and the decode-dispatch
//! loop run as separate tasks so a slow or panicking user callback can
//! never starve the socket reader or delay a heartbeat write.

use crate::dispatch::{Event, HandlerRegistry};
use crate::error::GatewayError;
use crate::protocol::{Frame, IdentifyPayload, OpCode, ReadyPayload, ResumePayload};
use crate::session::{Session, ShardConfig};
use bot_core::{Intent, User};
use bot_token::TokenSource;
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Inbound frame queue length; the reader must keep draining the socket
/// even while a callback is slow, so this buffer absorbs bursts
const FRAME_QUEUE_SIZE: usize = 10_000;

/// Close-signal queue length
const CLOSE_QUEUE_SIZE: usize = 10;

/// Heartbeat cadence used until the hello frame supplies the real interval
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport
    Disconnected,
    /// Transport open, awaiting hello
    Connected,
    /// Identify or resume sent
    Authenticating,
    /// Dispatch loop running
    Streaming,
    /// Terminal condition hit, releasing the transport
    Closing,
}

/// Session fields the processing task mutates while the connection owner
/// waits in `listening`; folded back into the `Session` on exit
#[derive(Debug, Default)]
struct SharedSession {
    id: RwLock<String>,
    last_seq: AtomicU64,
    shard: RwLock<ShardConfig>,
    user: RwLock<Option<User>>,
}

impl SharedSession {
    fn from_session(session: &Session) -> Self {
        Self {
            id: RwLock::new(session.id.clone()),
            last_seq: AtomicU64::new(session.last_seq),
            shard: RwLock::new(session.shard),
            user: RwLock::new(None),
        }
    }

    fn update_seq(&self, seq: u64) {
        if seq > 0 {
            self.last_seq.fetch_max(seq, Ordering::AcqRel);
        }
    }

    fn apply_ready(&self, ready: &ReadyPayload) {
        *self.id.write() = ready.session_id.clone();
        if let Some([shard_id, shard_count]) = ready.shard {
            *self.shard.write() = ShardConfig::new(shard_id, shard_count);
        }
        *self.user.write() = Some(ready.user.clone());
    }
}

/// One shard's gateway connection
pub struct Connection {
    session: Session,
    registry: Arc<HandlerRegistry>,
    token: Arc<dyn TokenSource>,
    state: ConnectionState,
    stream: Option<WsStream>,
    user: Option<User>,
}

impl Connection {
    /// Create a connection for a session
    ///
    /// The session is owned exclusively by this connection until
    /// [`Connection::into_session`] hands it back.
    #[must_use]
    pub fn new(session: Session, registry: Arc<HandlerRegistry>, token: Arc<dyn TokenSource>) -> Self {
        Self {
            session,
            registry,
            token,
            state: ConnectionState::Disconnected,
            stream: None,
            user: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The session this connection drives
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The bot identity reported by the READY handshake
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Recover the session for re-dispatch after termination
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Open the transport to the session's gateway URL
    pub async fn connect(&mut self) -> Result<(), GatewayError> {
        if self.session.url.is_empty() {
            return Err(GatewayError::UrlInvalid);
        }

        let (stream, _response) = connect_async(&self.session.url)
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        info!(session = %self.session, url = %self.session.url, "connected");
        Ok(())
    }

    /// Send the identify frame establishing a brand-new session
    ///
    /// A zero intent mask is replaced with the minimal guild-events mask;
    /// the gateway rejects an empty subscription outright, so this keeps a
    /// callback-less process connectable.
    pub async fn identify(&mut self) -> Result<(), GatewayError> {
        if self.session.intent.is_empty() {
            self.session.intent = Intent::GUILDS;
        }
        let token = self.token.credential().await?;
        let frame = Frame::identify(&IdentifyPayload {
            token,
            intents: self.session.intent,
            shard: [self.session.shard.shard_id, self.session.shard.shard_count],
            properties: None,
        })?;
        self.send(&frame).await?;
        self.state = ConnectionState::Authenticating;
        Ok(())
    }

    /// Send the resume frame re-attaching to the prior session
    pub async fn resume(&mut self) -> Result<(), GatewayError> {
        let token = self.token.credential().await?;
        let frame = Frame::resume(&ResumePayload {
            token,
            session_id: self.session.id.clone(),
            seq: self.session.last_seq,
        })?;
        self.send(&frame).await?;
        self.state = ConnectionState::Authenticating;
        Ok(())
    }

    /// Run the connection until a terminal close condition
    ///
    /// Spawns the socket-read task and the decode-dispatch task, then
    /// services the heartbeat timer and the close channel. Returns the
    /// terminal error after stopping the timer and releasing the transport;
    /// the session carries the latest id and sequence for the restart
    /// decision.
    pub async fn listening(&mut self) -> Result<(), GatewayError> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| GatewayError::Transport("not connected".to_string()))?;
        let (mut sink, read_half) = stream.split();

        let (frame_tx, frame_rx) = mpsc::channel::<String>(FRAME_QUEUE_SIZE);
        let (close_tx, mut close_rx) = mpsc::channel::<GatewayError>(CLOSE_QUEUE_SIZE);
        let (hello_tx, mut hello_rx) = mpsc::channel::<u64>(1);

        let shared = Arc::new(SharedSession::from_session(&self.session));
        let read_task = tokio::spawn(read_loop(read_half, frame_tx, close_tx.clone()));
        let process_task = tokio::spawn(process_loop(
            frame_rx,
            Arc::clone(&self.registry),
            Arc::clone(&shared),
            close_tx,
            hello_tx,
        ));

        self.state = ConnectionState::Streaming;
        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + DEFAULT_HEARTBEAT_INTERVAL,
            DEFAULT_HEARTBEAT_INTERVAL,
        );

        let err = loop {
            tokio::select! {
                Some(err) = close_rx.recv() => break err,
                Some(interval_ms) = hello_rx.recv() => {
                    let period = Duration::from_millis(interval_ms);
                    heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    debug!(session = %self.session, ?period, "heartbeat timer armed");
                }
                _ = heartbeat.tick() => {
                    let seq = shared.last_seq.load(Ordering::Acquire);
                    let frame = Frame::heartbeat(seq);
                    debug!(session = %self.session, seq, "heartbeat");
                    match frame.to_json() {
                        Ok(text) => {
                            if let Err(write_err) = sink.send(WsMessage::Text(text)).await {
                                break GatewayError::Transport(write_err.to_string());
                            }
                        }
                        Err(err) => break GatewayError::Codec(err),
                    }
                }
            }
        };

        self.state = ConnectionState::Closing;
        read_task.abort();
        process_task.abort();
        let _ = sink.close().await;

        self.session.id = shared.id.read().clone();
        self.session.last_seq = shared.last_seq.load(Ordering::Acquire);
        self.session.shard = *shared.shard.read();
        self.user = shared.user.read().clone();
        self.state = ConnectionState::Disconnected;

        error!(err = %err, session = %self.session, "listening stopped");
        Err(err)
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), GatewayError> {
        let text = frame.to_json()?;
        debug!(session = %self.session, op = %frame.op, "write frame");
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| GatewayError::Transport("not connected".to_string()))?;
        stream
            .send(WsMessage::Text(text))
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session", &self.session)
            .field("state", &self.state)
            .finish()
    }
}

/// Read frames off the socket into the bounded queue
///
/// Nothing else touches the socket's read half; close conditions are
/// reported on the close channel and end the task.
async fn read_loop(
    mut stream: SplitStream<WsStream>,
    frames: mpsc::Sender<String>,
    close: mpsc::Sender<GatewayError>,
) {
    while let Some(next) = stream.next().await {
        match next {
            Ok(WsMessage::Text(text)) => {
                if frames.send(text).await.is_err() {
                    return;
                }
            }
            Ok(WsMessage::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => {
                    if frames.send(text).await.is_err() {
                        return;
                    }
                }
                Err(_) => debug!("ignoring non-utf8 binary frame"),
            },
            Ok(WsMessage::Close(frame)) => {
                let err = match frame {
                    Some(frame) => GatewayError::Closed {
                        code: Some(u16::from(frame.code)),
                        reason: frame.reason.into_owned(),
                    },
                    None => GatewayError::Closed {
                        code: None,
                        reason: "closed without close frame".to_string(),
                    },
                };
                let _ = close.send(err).await;
                return;
            }
            // Ping/pong are answered by the transport layer
            Ok(_) => {}
            Err(err) => {
                let _ = close.send(GatewayError::Transport(err.to_string())).await;
                return;
            }
        }
    }
    let _ = close
        .send(GatewayError::Closed {
            code: None,
            reason: "connection reset".to_string(),
        })
        .await;
}

/// Drain the frame queue: built-in op codes first, then the READY
/// intercept, then registry dispatch
async fn process_loop(
    mut frames: mpsc::Receiver<String>,
    registry: Arc<HandlerRegistry>,
    shared: Arc<SharedSession>,
    close: mpsc::Sender<GatewayError>,
    hello: mpsc::Sender<u64>,
) {
    while let Some(text) = frames.recv().await {
        let frame = match Frame::from_json(&text) {
            Ok(frame) => frame,
            Err(err) => {
                error!(%err, "dropping malformed frame");
                continue;
            }
        };
        if let Some(seq) = frame.s {
            shared.update_seq(seq);
        }

        match frame.op {
            OpCode::Hello => match frame.as_hello() {
                Some(payload) => {
                    let _ = hello.send(payload.heartbeat_interval).await;
                }
                None => error!("hello frame missing heartbeat interval"),
            },
            OpCode::HeartbeatAck => {}
            OpCode::Reconnect => {
                warn!("gateway requested reconnect");
                let _ = close.send(GatewayError::NeedReconnect).await;
            }
            OpCode::InvalidSession => {
                warn!("gateway invalidated session");
                let _ = close.send(GatewayError::InvalidSession).await;
            }
            OpCode::Dispatch => {
                if let Some(ready) = frame.as_ready() {
                    shared.apply_ready(&ready);
                    info!(
                        session_id = %ready.session_id,
                        user = %ready.user.username,
                        "gateway session ready"
                    );
                    continue;
                }

                let event = Event::from_frame(frame);
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    registry.dispatch(&event)
                }));
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        error!(%err, event_type = %event.raw_type, "event handler failed");
                    }
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!(
                            panic = %message,
                            event_type = %event.raw_type,
                            "event handler panicked"
                        );
                        let _ = close.send(GatewayError::CallbackPanic(message)).await;
                        return;
                    }
                }
            }
            op => debug!(%op, "ignoring unexpected frame"),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
