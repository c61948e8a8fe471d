//! # bot-gateway
//!
//! The gateway session subsystem: per-connection protocol state machine,
//! typed event dispatch, and the multi-shard session manager that keeps
//! every shard connected.

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod session;

pub use connection::{Connection, ConnectionState};
pub use dispatch::{Event, Handler, HandlerError, HandlerRegistry, HandlerResult};
pub use error::GatewayError;
pub use protocol::{CloseCode, Frame, OpCode};
pub use session::{calc_interval, Session, SessionManager, ShardConfig};
