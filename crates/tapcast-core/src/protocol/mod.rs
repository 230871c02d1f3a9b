//! Protocol module containing message types, the binary codec, fixed-point
//! conversions, and the clipboard sequence counter.

pub mod android;
pub mod codec;
pub mod fixed;
pub mod messages;
pub mod sequence;

pub use codec::{decode_clipboard, encode_message, ProtocolError};
pub use messages::*;
pub use sequence::ClipboardSequence;
