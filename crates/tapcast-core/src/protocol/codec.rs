//! Binary codec for the tapcast control protocol.
//!
//! Wire format, outbound (client → agent): a one-byte [`ControlMessageType`]
//! tag followed by the variant's fields, big-endian throughout. Inbound only
//! the clipboard-content message exists:
//!
//! ```text
//! [tag:1 = 0x00][text_len:4 (i32)][text:text_len (UTF-8)]
//! ```

use crate::protocol::fixed::{fixed16_signed, fixed16_unsigned};
use crate::protocol::messages::{
    ControlMessage, BUTTON_PRIMARY, DEVICE_MSG_TYPE_CLIPBOARD, TEXT_MAX_LENGTH,
};
use thiserror::Error;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The tag byte from the peer is not the expected value.
    #[error("unexpected message tag: 0x{0:02X}")]
    UnexpectedTag(u8),

    /// The text exceeds the wire format's length budget.
    #[error("payload too large: {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// A numeric input is outside its contractual range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload could not be parsed (negative length, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a [`ControlMessage`] into its wire form, tag byte included.
///
/// Pure and total for well-formed input. Touch and scroll coordinates are
/// clamped to `[0, width-1]` / `[0, height-1]` rather than rejected.
///
/// # Errors
///
/// - [`ProtocolError::PayloadTooLarge`] when set-clipboard text exceeds
///   [`TEXT_MAX_LENGTH`] bytes.
/// - [`ProtocolError::InvalidArgument`] when a pressure or scroll delta is
///   outside its fixed-point range.
pub fn encode_message(msg: &ControlMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(32);
    buf.push(msg.control_type() as u8);

    match msg {
        ControlMessage::InjectKeycode {
            action,
            keycode,
            repeat,
            metastate,
        } => {
            buf.push(*action as u8);
            buf.extend_from_slice(&keycode.to_be_bytes());
            buf.extend_from_slice(&repeat.to_be_bytes());
            buf.extend_from_slice(&metastate.to_be_bytes());
        }
        ControlMessage::InjectText { text } => {
            write_text_block(&mut buf, text)?;
        }
        ControlMessage::InjectTouch {
            action,
            pointer_id,
            x,
            y,
            width,
            height,
            pressure,
        } => {
            buf.push(*action as u8);
            buf.extend_from_slice(&pointer_id.to_be_bytes());
            buf.extend_from_slice(&clamp_axis(*x, *width).to_be_bytes());
            buf.extend_from_slice(&clamp_axis(*y, *height).to_be_bytes());
            buf.extend_from_slice(&width.to_be_bytes());
            buf.extend_from_slice(&height.to_be_bytes());
            buf.extend_from_slice(&fixed16_unsigned(*pressure)?.to_be_bytes());
            buf.extend_from_slice(&BUTTON_PRIMARY.to_be_bytes()); // action button
            buf.extend_from_slice(&BUTTON_PRIMARY.to_be_bytes()); // buttons
        }
        ControlMessage::InjectScroll {
            x,
            y,
            width,
            height,
            hscroll,
            vscroll,
        } => {
            buf.extend_from_slice(&clamp_axis(*x, *width).to_be_bytes());
            buf.extend_from_slice(&clamp_axis(*y, *height).to_be_bytes());
            buf.extend_from_slice(&width.to_be_bytes());
            buf.extend_from_slice(&height.to_be_bytes());
            buf.extend_from_slice(&fixed16_signed(*hscroll)?.to_be_bytes());
            buf.extend_from_slice(&fixed16_signed(*vscroll)?.to_be_bytes());
            buf.extend_from_slice(&BUTTON_PRIMARY.to_be_bytes());
        }
        ControlMessage::BackOrScreenOn { action } => {
            buf.push(*action as u8);
        }
        ControlMessage::ExpandNotificationPanel
        | ControlMessage::ExpandSettingsPanel
        | ControlMessage::CollapsePanels
        | ControlMessage::RotateDevice => {} // tag byte only
        ControlMessage::GetClipboard { copy_key } => {
            buf.push(*copy_key as u8);
        }
        ControlMessage::SetClipboard {
            sequence,
            text,
            paste,
        } => {
            let len = text.len();
            if len > TEXT_MAX_LENGTH {
                return Err(ProtocolError::PayloadTooLarge {
                    len,
                    max: TEXT_MAX_LENGTH,
                });
            }
            buf.extend_from_slice(&sequence.to_be_bytes());
            buf.push(u8::from(*paste));
            write_text_block(&mut buf, text)?;
        }
        ControlMessage::SetDisplayPower { on } => {
            buf.push(u8::from(*on));
        }
    }

    Ok(buf)
}

/// Clamps a coordinate to `[0, extent - 1]`.
fn clamp_axis(value: i32, extent: u16) -> i32 {
    value.clamp(0, i32::from(extent).saturating_sub(1))
}

/// Writes a 4-byte signed byte-length prefix followed by the UTF-8 bytes.
fn write_text_block(buf: &mut Vec<u8>, text: &str) -> Result<(), ProtocolError> {
    let bytes = text.as_bytes();
    let len = i32::try_from(bytes.len()).map_err(|_| ProtocolError::PayloadTooLarge {
        len: bytes.len(),
        max: i32::MAX as usize,
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one clipboard-content device message from the start of `bytes`.
///
/// Returns the clipboard text and the number of bytes consumed. A declared
/// length of zero yields the empty string with no text bytes read.
///
/// # Errors
///
/// - [`ProtocolError::UnexpectedTag`] if the tag byte is not the clipboard
///   device tag.
/// - [`ProtocolError::InsufficientData`] if the slice is truncated.
/// - [`ProtocolError::MalformedPayload`] for a negative length or invalid
///   UTF-8.
pub fn decode_clipboard(bytes: &[u8]) -> Result<(String, usize), ProtocolError> {
    const HEADER: usize = 5; // tag + i32 length

    let Some(&tag) = bytes.first() else {
        return Err(ProtocolError::InsufficientData {
            needed: 1,
            available: 0,
        });
    };
    if tag != DEVICE_MSG_TYPE_CLIPBOARD {
        return Err(ProtocolError::UnexpectedTag(tag));
    }
    if bytes.len() < HEADER {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER,
            available: bytes.len(),
        });
    }

    let declared = i32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    if declared < 0 {
        return Err(ProtocolError::MalformedPayload(format!(
            "negative clipboard length: {declared}"
        )));
    }
    let len = declared as usize;
    if bytes.len() < HEADER + len {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER + len,
            available: bytes.len(),
        });
    }

    let text = std::str::from_utf8(&bytes[HEADER..HEADER + len])
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((text, HEADER + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
