//! Device transport abstraction.
//!
//! A [`DeviceTransport`] knows how to move files onto the device, run a
//! remote command, and open byte streams to the on-device agent.  The
//! session layer is written entirely against this trait, so it can run
//! over a real forwarded TCP port ([`tcp::TcpTransport`]) or fully
//! in-memory for tests ([`mock::MockTransport`]).

pub mod mock;
pub mod tcp;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// A bidirectional byte stream connected to the agent.
///
/// Blanket-implemented for any async read/write type, so transports can
/// return `TcpStream`, `DuplexStream`, or scripted test mocks alike.
pub trait AgentStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AgentStream for T {}

/// Owned, type-erased agent stream handed out by a transport.
pub type BoxedStream = Box<dyn AgentStream>;

/// Errors reported by transport implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Opening a socket to the agent failed.
    #[error("failed to open agent socket {name}: {source}")]
    OpenSocket {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Pushing a file onto the device failed.
    #[error("failed to push file to {remote}: {source}")]
    Push {
        remote: String,
        #[source]
        source: std::io::Error,
    },

    /// Starting a remote shell command failed.
    #[error("failed to start remote command: {source}")]
    Shell {
        #[source]
        source: std::io::Error,
    },

    /// The transport does not implement this operation.
    #[error("operation not supported by this transport: {0}")]
    Unsupported(&'static str),
}

/// Moves bytes between the client and a device-side agent.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Copies a local file to `remote` on the device.
    async fn push(&self, local: &Path, remote: &str) -> Result<(), TransportError>;

    /// Starts `command` on the device and returns its combined output stream.
    ///
    /// The stream stays open for the lifetime of the remote process; the
    /// caller reads startup output from it and then keeps it alive.
    async fn shell(&self, command: &[String]) -> Result<BoxedStream, TransportError>;

    /// Opens a byte stream to the agent socket `name`.
    ///
    /// Consecutive opens against the same name yield independent streams;
    /// the agent hands out its video stream first, then its control stream.
    async fn open_socket(&self, name: &str) -> Result<BoxedStream, TransportError>;
}
