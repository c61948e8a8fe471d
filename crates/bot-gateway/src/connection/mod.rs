//! Per-shard gateway connection

mod connection;

pub use connection::{Connection, ConnectionState};
