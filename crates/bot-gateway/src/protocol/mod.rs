//! Gateway wire protocol
//!
//! JSON frames with an integer op code, optional sequence number, optional
//! event type string, and an op-dependent payload.

mod close_codes;
mod frame;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use frame::Frame;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, ReadyPayload, ResumePayload};
