//! TCP transport for a pre-forwarded agent socket.
//!
//! Assumes the device bridge has already forwarded a local TCP port to the
//! agent's abstract socket (e.g. `adb forward tcp:27183 localabstract:tapcast`)
//! and that the agent is already running.  File push and remote shell are
//! therefore out of scope for this transport; sessions using it must leave
//! `agent_package` unset so deployment is skipped.

use std::net::SocketAddr;
use std::path::Path;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use super::{BoxedStream, DeviceTransport, TransportError};

/// Connects each agent stream to a single forwarded TCP address.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: SocketAddr,
}

impl TcpTransport {
    /// Creates a transport that dials `addr` for every socket open.
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// The forwarded address this transport dials.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl DeviceTransport for TcpTransport {
    async fn push(&self, _local: &Path, _remote: &str) -> Result<(), TransportError> {
        Err(TransportError::Unsupported(
            "file push over a forwarded port; deploy the agent out of band",
        ))
    }

    async fn shell(&self, _command: &[String]) -> Result<BoxedStream, TransportError> {
        Err(TransportError::Unsupported(
            "remote shell over a forwarded port; start the agent out of band",
        ))
    }

    async fn open_socket(&self, name: &str) -> Result<BoxedStream, TransportError> {
        let stream = TcpStream::connect(self.addr)
            .await
            .map_err(|source| TransportError::OpenSocket {
                name: name.to_string(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY on agent stream: {e}");
        }
        debug!(socket = name, addr = %self.addr, "agent stream connected");
        Ok(Box::new(stream))
    }
}
