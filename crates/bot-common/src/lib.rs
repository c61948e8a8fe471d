//! # bot-common
//!
//! Shared utilities for the SDK: configuration loading, tracing setup, and
//! webhook signature helpers.

pub mod auth;
pub mod config;
pub mod telemetry;

pub use auth::signature;
pub use config::{BotConfig, ConfigError};
pub use telemetry::{init_tracing, init_tracing_with_config, TracingConfig};
