//! # tapcast-client
//!
//! Client-side session management for tapcast: deploys the on-device
//! agent, ingests its video stream, and injects input over the control
//! stream.
//!
//! The crate is structured around one [`Session`] per device:
//! - [`transport`] abstracts how bytes reach the device.
//! - [`session`] owns the lifecycle state machine and frame loop.
//! - [`clipboard`] runs request/response clipboard exchanges.
//! - [`listener`] delivers Init/Frame/Disconnect events in order.
//! - [`video`] is the seam for a caller-supplied decoder.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod listener;
pub mod session;
pub mod transport;
pub mod video;

pub use clipboard::ClipboardChannel;
pub use config::{ConfigError, SessionOptions};
pub use error::ClientError;
pub use listener::{EventKind, ListenerHandle, ListenerRegistry, SessionEvent};
pub use session::{RunMode, Session, SessionState};
pub use transport::{DeviceTransport, TransportError};
pub use video::{Frame, VideoDecoder};
