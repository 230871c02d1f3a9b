//! All tapcast control-message types.
//!
//! Messages follow the agent's wire format: a one-byte command tag followed
//! by big-endian fields. The exact field layout for each variant is
//! implemented in [`crate::protocol::codec`].

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Tag of the single device → client message (clipboard content).
pub const DEVICE_MSG_TYPE_CLIPBOARD: u8 = 0x00;

/// Reserved pointer id denoting the synthetic "mouse" pointer.
///
/// Real fingers use non-negative ids; the agent treats -1 as the virtual
/// mouse. Multi-finger gestures pass explicit ids instead.
pub const POINTER_ID_MOUSE: i64 = -1;

/// Primary button bit (AMOTION_EVENT_BUTTON_PRIMARY).
///
/// Touch and scroll messages carry fixed button masks set to this value.
pub const BUTTON_PRIMARY: i32 = 1 << 0;

/// Maximum UTF-8 byte length accepted by the agent for clipboard text.
pub const TEXT_MAX_LENGTH: usize = 300;

/// Fixed divisor applied to scroll step deltas before the signed
/// fixed-point conversion, so a step of ±16 maps to the full ±1.0 range.
pub const SCROLL_STEP_UNIT: f32 = 16.0;

// ── Command tags ──────────────────────────────────────────────────────────────

/// One-byte command tags prefixed to every outbound control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlMessageType {
    InjectKeycode = 0x00,
    InjectText = 0x01,
    InjectTouch = 0x02,
    InjectScroll = 0x03,
    BackOrScreenOn = 0x04,
    ExpandNotificationPanel = 0x05,
    ExpandSettingsPanel = 0x06,
    CollapsePanels = 0x07,
    GetClipboard = 0x08,
    SetClipboard = 0x09,
    SetDisplayPower = 0x0A,
    RotateDevice = 0x0B,
}

impl TryFrom<u8> for ControlMessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ControlMessageType::InjectKeycode),
            0x01 => Ok(ControlMessageType::InjectText),
            0x02 => Ok(ControlMessageType::InjectTouch),
            0x03 => Ok(ControlMessageType::InjectScroll),
            0x04 => Ok(ControlMessageType::BackOrScreenOn),
            0x05 => Ok(ControlMessageType::ExpandNotificationPanel),
            0x06 => Ok(ControlMessageType::ExpandSettingsPanel),
            0x07 => Ok(ControlMessageType::CollapsePanels),
            0x08 => Ok(ControlMessageType::GetClipboard),
            0x09 => Ok(ControlMessageType::SetClipboard),
            0x0A => Ok(ControlMessageType::SetDisplayPower),
            0x0B => Ok(ControlMessageType::RotateDevice),
            _ => Err(()),
        }
    }
}

// ── Field enums ───────────────────────────────────────────────────────────────

/// Key event action (AKEY_EVENT_ACTION_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyEventAction {
    Down = 0x00,
    Up = 0x01,
}

impl TryFrom<u8> for KeyEventAction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(KeyEventAction::Down),
            0x01 => Ok(KeyEventAction::Up),
            _ => Err(()),
        }
    }
}

/// Touch event action (AMOTION_EVENT_ACTION_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TouchAction {
    Down = 0x00,
    Up = 0x01,
    Move = 0x02,
}

impl TryFrom<u8> for TouchAction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(TouchAction::Down),
            0x01 => Ok(TouchAction::Up),
            0x02 => Ok(TouchAction::Move),
            _ => Err(()),
        }
    }
}

/// Copy-key selector carried by the get-clipboard request.
///
/// `Copy`/`Cut` ask the agent to first press the corresponding key so the
/// current selection lands in the clipboard before it is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CopyKey {
    None = 0x00,
    Copy = 0x01,
    Cut = 0x02,
}

// ── Control messages ──────────────────────────────────────────────────────────

/// All outbound control messages, discriminated by [`ControlMessageType`].
///
/// Each variant carries only the fields relevant to that command; the fixed
/// button masks of touch/scroll are supplied by the codec. Values are
/// immutable once constructed and exist only transiently during encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlMessage {
    /// Press or release a physical key by Android keycode.
    InjectKeycode {
        action: KeyEventAction,
        /// `AKEYCODE_*` value, see [`crate::protocol::android::keycode`].
        keycode: i32,
        /// Repeat count for held keys.
        repeat: i32,
        /// `AMETA_*` bitmask, see [`crate::protocol::android::meta`].
        metastate: i32,
    },
    /// Type a UTF-8 string.
    InjectText { text: String },
    /// Touch down/up/move at an absolute screen position.
    InjectTouch {
        action: TouchAction,
        pointer_id: i64,
        x: i32,
        y: i32,
        /// Screen resolution the coordinates are relative to.
        width: u16,
        height: u16,
        /// Pressure in `[0.0, 1.0]`, encoded as unsigned fixed-point 16.
        pressure: f32,
    },
    /// Scroll at an absolute screen position.
    InjectScroll {
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        /// Horizontal delta in `[-1.0, 1.0]`, encoded as signed fixed-point 16.
        hscroll: f32,
        /// Vertical delta in `[-1.0, 1.0]`, encoded as signed fixed-point 16.
        vscroll: f32,
    },
    /// Press Back, or turn the screen on if it is off (on `Down` only).
    BackOrScreenOn { action: KeyEventAction },
    ExpandNotificationPanel,
    ExpandSettingsPanel,
    CollapsePanels,
    /// Request the device clipboard; the agent answers with a clipboard
    /// device message (see [`crate::protocol::codec::decode_clipboard`]).
    GetClipboard { copy_key: CopyKey },
    /// Replace the device clipboard, optionally pasting immediately.
    SetClipboard {
        /// Monotonic sequence number from [`crate::ClipboardSequence`].
        sequence: i64,
        text: String,
        paste: bool,
    },
    /// Turn the display on or off while streaming continues.
    SetDisplayPower { on: bool },
    RotateDevice,
}

impl ControlMessage {
    /// Returns the [`ControlMessageType`] tag for this message.
    pub fn control_type(&self) -> ControlMessageType {
        match self {
            ControlMessage::InjectKeycode { .. } => ControlMessageType::InjectKeycode,
            ControlMessage::InjectText { .. } => ControlMessageType::InjectText,
            ControlMessage::InjectTouch { .. } => ControlMessageType::InjectTouch,
            ControlMessage::InjectScroll { .. } => ControlMessageType::InjectScroll,
            ControlMessage::BackOrScreenOn { .. } => ControlMessageType::BackOrScreenOn,
            ControlMessage::ExpandNotificationPanel => {
                ControlMessageType::ExpandNotificationPanel
            }
            ControlMessage::ExpandSettingsPanel => ControlMessageType::ExpandSettingsPanel,
            ControlMessage::CollapsePanels => ControlMessageType::CollapsePanels,
            ControlMessage::GetClipboard { .. } => ControlMessageType::GetClipboard,
            ControlMessage::SetClipboard { .. } => ControlMessageType::SetClipboard,
            ControlMessage::SetDisplayPower { .. } => ControlMessageType::SetDisplayPower,
            ControlMessage::RotateDevice => ControlMessageType::RotateDevice,
        }
    }
}
