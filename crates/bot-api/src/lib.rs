//! # bot-api
//!
//! Typed REST client for the platform's resource API. The session manager
//! consumes [`ApiClient::gateway_bot`] for connection info; the remaining
//! calls cover the message and direct-message surfaces event handlers
//! commonly reply through.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{CreateDirectMessage, DirectMessageSession, MessageToCreate};
