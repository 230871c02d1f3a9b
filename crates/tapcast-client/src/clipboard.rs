//! Clipboard request/response channel.
//!
//! Shares the control socket with command injection.  A `get` holds the
//! socket for its whole request/response exchange, so concurrent commands
//! queue behind it rather than interleaving with the pending response.

use std::sync::Arc;
use std::time::Duration;

use tapcast_core::protocol::messages::{
    ControlMessage, CopyKey, DEVICE_MSG_TYPE_CLIPBOARD, TEXT_MAX_LENGTH,
};
use tapcast_core::{encode_message, ClipboardSequence, ProtocolError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time;
use tracing::debug;

use crate::error::ClientError;
use crate::transport::BoxedStream;

/// Control socket shared between command injection and clipboard exchanges.
pub(crate) type SharedControlSocket = Arc<Mutex<Option<BoxedStream>>>;

/// How long a read may idle before stale-byte draining stops.
const DRAIN_POLL: Duration = Duration::from_millis(1);

/// Clipboard operations over the shared control socket.
pub struct ClipboardChannel {
    socket: SharedControlSocket,
    sequence: Arc<ClipboardSequence>,
}

impl ClipboardChannel {
    pub(crate) fn new(socket: SharedControlSocket, sequence: Arc<ClipboardSequence>) -> Self {
        Self { socket, sequence }
    }

    /// Fetches the device clipboard text.
    ///
    /// Sends a copy request, then waits up to `timeout` for the agent's
    /// clipboard response.  Stale bytes left on the socket from earlier
    /// exchanges are discarded before the request goes out.
    ///
    /// # Errors
    ///
    /// [`ClientError::Timeout`] when no response arrives in time,
    /// [`ClientError::Protocol`] when the response is malformed, and
    /// [`ClientError::Precondition`] when the session is not streaming.
    pub async fn get(&self, timeout: Duration) -> Result<String, ClientError> {
        let request = encode_message(&ControlMessage::GetClipboard {
            copy_key: CopyKey::Copy,
        })?;

        let mut guard = self.socket.lock().await;
        let socket = guard
            .as_mut()
            .ok_or(ClientError::Precondition("control socket not connected"))?;

        drain_stale(socket).await;

        socket.write_all(&request).await.map_err(|source| ClientError::Io {
            context: "control socket write",
            source,
        })?;

        let tag = match time::timeout(timeout, socket.read_u8()).await {
            Ok(read) => read.map_err(|source| ClientError::Io {
                context: "control socket read",
                source,
            })?,
            Err(_) => return Err(ClientError::Timeout("clipboard response")),
        };
        if tag != DEVICE_MSG_TYPE_CLIPBOARD {
            return Err(ClientError::Protocol(ProtocolError::UnexpectedTag(tag)));
        }

        let mut len_buf = [0u8; 4];
        socket
            .read_exact(&mut len_buf)
            .await
            .map_err(|source| ClientError::Io {
                context: "control socket read",
                source,
            })?;
        let declared = i32::from_be_bytes(len_buf);
        if declared < 0 {
            return Err(ClientError::Protocol(ProtocolError::MalformedPayload(
                format!("negative clipboard length {declared}"),
            )));
        }
        // The length is peer-supplied; cap it before allocating the body.
        let declared = declared as usize;
        if declared > TEXT_MAX_LENGTH {
            return Err(ClientError::Protocol(ProtocolError::PayloadTooLarge {
                len: declared,
                max: TEXT_MAX_LENGTH,
            }));
        }

        let mut body = vec![0u8; declared];
        socket
            .read_exact(&mut body)
            .await
            .map_err(|source| ClientError::Io {
                context: "control socket read",
                source,
            })?;
        String::from_utf8(body).map_err(|e| {
            ClientError::Protocol(ProtocolError::MalformedPayload(format!(
                "clipboard text is not valid UTF-8: {e}"
            )))
        })
    }

    /// Replaces the device clipboard with `text`, optionally pasting it
    /// into the focused editor.
    ///
    /// Each accepted request consumes the next value of the shared
    /// sequence counter; rejected over-length text does not advance it.
    ///
    /// # Errors
    ///
    /// [`ClientError::Protocol`] when `text` exceeds the protocol's length
    /// cap, [`ClientError::Precondition`] when the session is not
    /// streaming.
    pub async fn set(&self, text: &str, paste: bool) -> Result<Vec<u8>, ClientError> {
        if text.len() > TEXT_MAX_LENGTH {
            return Err(ClientError::Protocol(ProtocolError::PayloadTooLarge {
                len: text.len(),
                max: TEXT_MAX_LENGTH,
            }));
        }

        let message = ControlMessage::SetClipboard {
            sequence: self.sequence.next(),
            text: text.to_string(),
            paste,
        };
        let bytes = encode_message(&message)?;

        let mut guard = self.socket.lock().await;
        let socket = guard
            .as_mut()
            .ok_or(ClientError::Precondition("control socket not connected"))?;
        socket.write_all(&bytes).await.map_err(|source| ClientError::Io {
            context: "control socket write",
            source,
        })?;
        Ok(bytes)
    }

    /// Last sequence value handed out for `set` requests.
    pub fn sequence(&self) -> i64 {
        self.sequence.current()
    }
}

/// Discards any bytes already buffered on the socket.
///
/// Unsolicited agent output (e.g. duplicate clipboard responses) would
/// otherwise be mistaken for the reply to the next request.
async fn drain_stale(socket: &mut BoxedStream) {
    let mut scratch = [0u8; 1024];
    loop {
        match time::timeout(DRAIN_POLL, socket.read(&mut scratch)).await {
            Ok(Ok(0)) => break, // closed; the caller's next read reports it
            Ok(Ok(n)) => debug!(bytes = n, "discarded stale control bytes"),
            Ok(Err(_)) | Err(_) => break,
        }
    }
}
