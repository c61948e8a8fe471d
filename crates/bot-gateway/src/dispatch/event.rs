//! Dispatched event envelope

use crate::protocol::{Frame, OpCode};
use bot_core::EventType;
use serde_json::Value;

/// The wire envelope handed to callbacks alongside the decoded payload
///
/// Constructed per inbound dispatch frame and discarded after dispatch.
#[derive(Debug, Clone)]
pub struct Event {
    /// Operation code (always `Dispatch` for routed events)
    pub op: OpCode,
    /// Sequence number; 0 when the frame carried none
    pub seq: u64,
    /// Parsed event type, `None` for types this SDK does not know
    pub event_type: Option<EventType>,
    /// The raw `t` string as received
    pub raw_type: String,
    /// Undecoded payload
    pub data: Value,
}

impl Event {
    /// Build an envelope from a parsed wire frame
    #[must_use]
    pub fn from_frame(frame: Frame) -> Self {
        let raw_type = frame.t.unwrap_or_default();
        Self {
            op: frame.op,
            seq: frame.s.unwrap_or(0),
            event_type: EventType::from_str(&raw_type),
            raw_type,
            data: frame.d.unwrap_or(Value::Null),
        }
    }
}
