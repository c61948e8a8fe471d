//! # bot-token
//!
//! Credential management for the SDK. Keeps exactly one valid bearer
//! credential available to every gateway connection and REST call,
//! refreshing it ahead of expiry in a background task.

pub mod access_token;
pub mod error;
pub mod manager;
pub mod source;

pub use access_token::AccessToken;
pub use error::TokenError;
pub use manager::{ManagerState, TokenManager};
pub use source::TokenSource;
