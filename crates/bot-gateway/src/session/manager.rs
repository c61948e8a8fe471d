//! Session manager
//!
//! Owns every shard's session for one bot identity: sizes the shard set
//! from the gateway info, throttles startup against the server's admission
//! window, and keeps each shard connected indefinitely.

use crate::connection::Connection;
use crate::dispatch::HandlerRegistry;
use crate::error::GatewayError;
use crate::session::{Session, ShardConfig};
use bot_core::{GatewayInfo, Intent};
use bot_token::TokenSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Compute the interval between shard startups
///
/// `max_concurrency` handshakes are admitted per rolling 5-second window,
/// so starts are spread evenly across it: 1 → 5s, 2 → 3s, 5 → 1s.
#[must_use]
pub fn calc_interval(max_concurrency: u32) -> Duration {
    let per_window = f64::from(max_concurrency.max(1));
    Duration::from_secs((5.0 / per_window).round() as u64)
}

/// Supervisor for all shards of one bot identity
///
/// Restarts are funneled through a single work queue drained by one loop:
/// a terminated connection enqueues its session instead of reconnecting
/// itself, which keeps the startup throttle global and the stack depth
/// constant under sustained reconnect churn.
pub struct SessionManager {
    registry: Arc<HandlerRegistry>,
}

impl SessionManager {
    /// Create a manager sharing the given callback registry with every
    /// connection it spawns
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Start one session per shard and supervise them forever
    ///
    /// Fails fast with [`GatewayError::SessionLimitExceeded`] before opening
    /// any transport when the shard count exceeds the remaining session
    /// starts. Otherwise this call never returns: the drain loop keeps
    /// restarting shards for the life of the process.
    pub async fn start(
        &self,
        info: &GatewayInfo,
        token: Arc<dyn TokenSource>,
        intent: Intent,
    ) -> Result<(), GatewayError> {
        let limit = &info.session_start_limit;
        if info.shards > limit.remaining {
            error!(
                shards = info.shards,
                remaining = limit.remaining,
                "session start limit exceeded"
            );
            return Err(GatewayError::SessionLimitExceeded {
                shards: info.shards,
                remaining: limit.remaining,
            });
        }

        let interval = calc_interval(limit.max_concurrency);
        info!(
            shards = info.shards,
            interval_secs = interval.as_secs(),
            "starting sessions"
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<Session>();
        for shard_id in 0..info.shards {
            let mut session = Session::new(
                info.url.clone(),
                intent,
                ShardConfig::new(shard_id, info.shards),
            );
            session.app_id = token.app_id().to_string();
            // Cannot fail: the receiver lives in this scope
            let _ = tx.send(session);
        }

        // The only sleep lives here, so the admission throttle is global
        // across shards rather than per shard.
        while let Some(session) = rx.recv().await {
            tokio::time::sleep(interval).await;
            let registry = Arc::clone(&self.registry);
            let token = Arc::clone(&token);
            let requeue = tx.clone();
            tokio::spawn(supervise(session, registry, token, requeue));
        }
        Ok(())
    }
}

/// Drive one connection attempt for a session
///
/// Connect and authentication failures drop the attempt (the process is
/// long-running and the failure is logged). A terminated stream puts the
/// session back on the queue; non-resumable terminations clear the session
/// id and sequence first so the next attempt identifies fresh.
async fn supervise(
    session: Session,
    registry: Arc<HandlerRegistry>,
    token: Arc<dyn TokenSource>,
    requeue: mpsc::UnboundedSender<Session>,
) {
    let mut conn = Connection::new(session, registry, token);
    if let Err(err) = conn.connect().await {
        error!(%err, session = %conn.session(), "connect failed, dropping attempt");
        return;
    }

    let auth = if conn.session().can_resume() {
        conn.resume().await
    } else {
        conn.identify().await
    };
    if let Err(err) = auth {
        error!(%err, session = %conn.session(), "identify/resume failed, dropping attempt");
        return;
    }

    let Err(err) = conn.listening().await else {
        return;
    };

    let mut session = conn.into_session();
    let resumable = err.is_resumable();
    if !resumable {
        session.reset();
    }
    warn!(%err, session = %session, resumable, "connection terminated, requeueing");
    let _ = requeue.send(session);
}
