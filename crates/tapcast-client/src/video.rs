//! Decoded frames and the decoder seam.
//!
//! The client does not decode video itself.  It feeds raw stream bytes to a
//! caller-supplied [`VideoDecoder`] and publishes whatever frames come back.

/// A single decoded video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u16,
    /// Frame height in pixels.
    pub height: u16,
    /// Raw pixel data in whatever layout the decoder produces.
    pub data: Vec<u8>,
}

/// Turns raw agent stream bytes into decoded frames.
///
/// Implementations are stateful: a coded unit may span multiple chunks, so
/// the decoder buffers partial input across `feed` calls.  A call may yield
/// zero, one, or several frames.
pub trait VideoDecoder: Send {
    /// Consumes one chunk of stream bytes.
    ///
    /// # Errors
    ///
    /// Returns a decoder-specific message when the chunk cannot be decoded.
    /// The session logs the error and keeps streaming; decode errors are
    /// not fatal to the session.
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, String>;
}
