//! Session state and the multi-shard session manager

mod manager;
mod session;

pub use manager::{calc_interval, SessionManager};
pub use session::{Session, ShardConfig};
