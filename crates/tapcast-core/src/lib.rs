//! # tapcast-core
//!
//! Shared library for tapcast containing the binary control-message codec,
//! fixed-point conversions, the clipboard sequence counter, gesture planning,
//! and Android key constants.
//!
//! This crate is pure protocol and arithmetic: it has zero dependencies on
//! sockets, OS APIs, or an async runtime. The session layer lives in
//! `tapcast-client`.
//!
//! # Protocol overview
//!
//! The remote agent exposes two byte streams: a video stream carrying a
//! compressed elementary stream, and a control stream carrying serialized
//! input commands. Every outbound control message starts with a one-byte
//! command tag followed by big-endian fields; the only inbound message is
//! the clipboard-content response. `protocol::codec` implements both
//! directions; `gesture` turns high-level tap/swipe intents into ordered
//! sequences of touch events and pauses for the session layer to execute.

pub mod gesture;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `tapcast_core::ControlMessage` instead of the full path.
pub use protocol::codec::{decode_clipboard, encode_message, ProtocolError};
pub use protocol::fixed::{fixed16_signed, fixed16_unsigned};
pub use protocol::messages::ControlMessage;
pub use protocol::sequence::ClipboardSequence;
