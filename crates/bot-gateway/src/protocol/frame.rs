//! Gateway frame format
//!
//! Every message on the wire is one JSON frame: `op` code, optional
//! sequence `s` and event type `t` (dispatch only), and an op-dependent
//! payload `d`.

use super::{HelloPayload, IdentifyPayload, OpCode, ReadyPayload, ResumePayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A gateway wire frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Operation code
    pub op: OpCode,

    /// Sequence number (only on dispatch frames)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event type (only on dispatch frames)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Op-dependent payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl Frame {
    // === Client frames ===

    /// Heartbeat frame (op 1) carrying the last received sequence
    #[must_use]
    pub fn heartbeat(last_seq: u64) -> Self {
        Self {
            op: OpCode::Heartbeat,
            s: None,
            t: None,
            d: Some(Value::Number(last_seq.into())),
        }
    }

    /// Identify frame (op 2)
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::Identify,
            s: None,
            t: None,
            d: Some(serde_json::to_value(payload)?),
        })
    }

    /// Resume frame (op 6)
    pub fn resume(payload: &ResumePayload) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::Resume,
            s: None,
            t: None,
            d: Some(serde_json::to_value(payload)?),
        })
    }

    // === Decoding server frames ===

    /// Try to parse the Hello payload (op 10)
    #[must_use]
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse the READY dispatch payload
    #[must_use]
    pub fn as_ready(&self) -> Option<ReadyPayload> {
        if !self.is_dispatch_of("READY") {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Whether this is a dispatch frame of the given event type
    #[must_use]
    pub fn is_dispatch_of(&self, event_type: &str) -> bool {
        self.op == OpCode::Dispatch && self.t.as_deref() == Some(event_type)
    }

    // === Utilities ===

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "Frame(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "Frame(op={})", self.op)
        }
    }
}
