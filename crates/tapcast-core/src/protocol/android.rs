//! Android key and meta-state constants for [`InjectKeycode`] messages.
//!
//! Values mirror the Android `KeyEvent` API (`AKEYCODE_*` / `AMETA_*`),
//! which is what the on-device agent feeds into the input manager. Only the
//! keys commonly driven remotely are listed; any other `KeyEvent` value can
//! be passed as a raw `i32`.
//!
//! [`InjectKeycode`]: crate::protocol::messages::ControlMessage::InjectKeycode

/// `AKEYCODE_*` values.
pub mod keycode {
    pub const AKEYCODE_UNKNOWN: i32 = 0;
    pub const AKEYCODE_HOME: i32 = 3;
    pub const AKEYCODE_BACK: i32 = 4;
    pub const AKEYCODE_DPAD_UP: i32 = 19;
    pub const AKEYCODE_DPAD_DOWN: i32 = 20;
    pub const AKEYCODE_DPAD_LEFT: i32 = 21;
    pub const AKEYCODE_DPAD_RIGHT: i32 = 22;
    pub const AKEYCODE_DPAD_CENTER: i32 = 23;
    pub const AKEYCODE_VOLUME_UP: i32 = 24;
    pub const AKEYCODE_VOLUME_DOWN: i32 = 25;
    pub const AKEYCODE_POWER: i32 = 26;
    pub const AKEYCODE_CAMERA: i32 = 27;
    pub const AKEYCODE_TAB: i32 = 61;
    pub const AKEYCODE_SPACE: i32 = 62;
    pub const AKEYCODE_ENTER: i32 = 66;
    pub const AKEYCODE_DEL: i32 = 67;
    pub const AKEYCODE_MENU: i32 = 82;
    pub const AKEYCODE_SEARCH: i32 = 84;
    pub const AKEYCODE_MEDIA_PLAY_PAUSE: i32 = 85;
    pub const AKEYCODE_PAGE_UP: i32 = 92;
    pub const AKEYCODE_PAGE_DOWN: i32 = 93;
    pub const AKEYCODE_ESCAPE: i32 = 111;
    pub const AKEYCODE_FORWARD_DEL: i32 = 112;
    pub const AKEYCODE_MOVE_HOME: i32 = 122;
    pub const AKEYCODE_MOVE_END: i32 = 123;
    pub const AKEYCODE_VOLUME_MUTE: i32 = 164;
    pub const AKEYCODE_APP_SWITCH: i32 = 187;
    pub const AKEYCODE_SLEEP: i32 = 223;
    pub const AKEYCODE_WAKEUP: i32 = 224;
}

/// `AMETA_*` modifier bitmask values.
pub mod meta {
    pub const AMETA_NONE: i32 = 0;
    pub const AMETA_SHIFT_ON: i32 = 0x01;
    pub const AMETA_ALT_ON: i32 = 0x02;
    pub const AMETA_SYM_ON: i32 = 0x04;
    pub const AMETA_CTRL_ON: i32 = 0x1000;
    pub const AMETA_META_ON: i32 = 0x10000;
    pub const AMETA_CAPS_LOCK_ON: i32 = 0x100000;
}
