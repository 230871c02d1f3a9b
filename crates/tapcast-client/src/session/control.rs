//! Control operations on a streaming session.
//!
//! Every sender encodes one control message and writes it to the shared
//! control socket.  Position-carrying operations need the stream
//! resolution, which latches when the first frame decodes; until then
//! they fail with a precondition error.

use std::time::Duration;

use tapcast_core::gesture::{plan_swipe, plan_tap, GestureStep};
use tapcast_core::protocol::messages::{
    ControlMessage, KeyEventAction, TouchAction, POINTER_ID_MOUSE, SCROLL_STEP_UNIT,
};
use tapcast_core::encode_message;
use tokio::io::AsyncWriteExt;
use tokio::time;
use tracing::trace;

use crate::error::ClientError;
use crate::session::Session;

/// Default hold time between tap down and up.
pub const DEFAULT_TAP_HOLD: Duration = Duration::from_millis(50);
/// Default pause after the swipe's touch-down.
pub const DEFAULT_SWIPE_DELAY: Duration = Duration::from_millis(5);
/// Default distance between consecutive swipe move events, in pixels.
pub const DEFAULT_SWIPE_STEP_LENGTH: u32 = 5;
/// Default pause between consecutive swipe move events.
pub const DEFAULT_SWIPE_STEP_DELAY: Duration = Duration::from_millis(5);

impl Session {
    /// Encodes `message` and writes it to the control socket.
    ///
    /// Returns the encoded bytes, which is occasionally useful for
    /// logging and testing.
    ///
    /// # Errors
    ///
    /// [`ClientError::Precondition`] before the control socket is
    /// connected; [`ClientError::Protocol`] when the message violates the
    /// wire format.
    pub async fn send_command(&self, message: &ControlMessage) -> Result<Vec<u8>, ClientError> {
        let bytes = encode_message(message)?;
        let mut guard = self.control_socket.lock().await;
        let socket = guard
            .as_mut()
            .ok_or(ClientError::Precondition("control socket not connected"))?;
        socket
            .write_all(&bytes)
            .await
            .map_err(|source| ClientError::Io {
                context: "control socket write",
                source,
            })?;
        trace!(session = %self.session_id, message = ?message.control_type(), "control message sent");
        Ok(bytes)
    }

    /// Injects a physical key event.
    pub async fn keycode(
        &self,
        keycode: i32,
        action: KeyEventAction,
        repeat: i32,
        metastate: i32,
    ) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::InjectKeycode {
            action,
            keycode,
            repeat,
            metastate,
        })
        .await
    }

    /// Types `text` into the focused editor.
    pub async fn inject_text(&self, text: &str) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::InjectText {
            text: text.to_string(),
        })
        .await
    }

    /// Injects a single touch event at `(x, y)` in stream coordinates.
    ///
    /// Requires the stream resolution; out-of-bounds positions are
    /// clamped during encoding.
    pub async fn touch(
        &self,
        x: i32,
        y: i32,
        action: TouchAction,
    ) -> Result<Vec<u8>, ClientError> {
        let (width, height) = self.require_resolution()?;
        self.send_command(&ControlMessage::InjectTouch {
            action,
            pointer_id: POINTER_ID_MOUSE,
            x,
            y,
            width,
            height,
            pressure: 1.0,
        })
        .await
    }

    /// Scrolls by whole wheel steps at `(x, y)`.
    ///
    /// Positive `vstep` scrolls up, negative down; `hstep` likewise for
    /// horizontal.  Steps map onto the protocol's fractional scroll units.
    pub async fn scroll(
        &self,
        x: i32,
        y: i32,
        hstep: f32,
        vstep: f32,
    ) -> Result<Vec<u8>, ClientError> {
        let (width, height) = self.require_resolution()?;
        self.send_command(&ControlMessage::InjectScroll {
            x,
            y,
            width,
            height,
            hscroll: hstep / SCROLL_STEP_UNIT,
            vscroll: vstep / SCROLL_STEP_UNIT,
        })
        .await
    }

    /// Presses Back, or wakes the screen when it is off.
    pub async fn back_or_screen_on(
        &self,
        action: KeyEventAction,
    ) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::BackOrScreenOn { action }).await
    }

    /// Pulls down the notification shade.
    pub async fn expand_notification_panel(&self) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::ExpandNotificationPanel).await
    }

    /// Pulls down the quick-settings shade.
    pub async fn expand_settings_panel(&self) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::ExpandSettingsPanel).await
    }

    /// Collapses any open shade.
    pub async fn collapse_panels(&self) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::CollapsePanels).await
    }

    /// Turns the device display on or off while streaming continues.
    pub async fn set_display_power(&self, on: bool) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::SetDisplayPower { on }).await
    }

    /// Rotates the device screen.
    pub async fn rotate_device(&self) -> Result<Vec<u8>, ClientError> {
        self.send_command(&ControlMessage::RotateDevice).await
    }

    /// Taps at `(x, y)`: touch-down, hold for `duration`, touch-up.
    pub async fn tap(&self, x: i32, y: i32, duration: Duration) -> Result<(), ClientError> {
        self.require_resolution()?;
        self.run_plan(plan_tap(x, y, duration)).await
    }

    /// Swipes from `start` to `end` with evenly spaced move events.
    ///
    /// `step_length` is the pixel distance between consecutive moves;
    /// `delay` pauses after the touch-down and `step_delay` between
    /// moves.  Endpoints are clamped to the stream bounds.
    pub async fn swipe(
        &self,
        start: (i32, i32),
        end: (i32, i32),
        delay: Duration,
        step_length: u32,
        step_delay: Duration,
    ) -> Result<(), ClientError> {
        let resolution = self.require_resolution()?;
        self.run_plan(plan_swipe(start, end, resolution, delay, step_length, step_delay))
            .await
    }

    /// Fetches the device clipboard with the default five-second deadline.
    pub async fn get_clipboard(&self) -> Result<String, ClientError> {
        self.clipboard().get(Duration::from_secs(5)).await
    }

    /// Replaces the device clipboard with `text`.
    pub async fn set_clipboard(&self, text: &str, paste: bool) -> Result<Vec<u8>, ClientError> {
        self.clipboard().set(text, paste).await
    }

    /// Executes a planned touch sequence, sleeping through its pauses.
    async fn run_plan(&self, plan: Vec<GestureStep>) -> Result<(), ClientError> {
        for step in plan {
            match step {
                GestureStep::Touch { action, x, y } => {
                    self.touch(x, y, action).await?;
                }
                GestureStep::Pause(duration) => time::sleep(duration).await,
            }
        }
        Ok(())
    }

    fn require_resolution(&self) -> Result<(u16, u16), ClientError> {
        self.resolution()
            .ok_or(ClientError::Precondition("stream resolution not yet known"))
    }
}
