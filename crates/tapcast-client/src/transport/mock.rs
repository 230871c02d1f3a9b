//! In-memory transport for tests.
//!
//! `MockTransport` hands out pre-created [`tokio::io::duplex`] streams in
//! the order the session opens them (video first, then control) and records
//! every push and shell invocation so tests can assert on the deployment
//! sequence.  The peer ends are returned to the test, which plays the role
//! of the on-device agent.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{duplex, AsyncWriteExt, DuplexStream};

use super::{BoxedStream, DeviceTransport, TransportError};

const STREAM_BUFFER: usize = 64 * 1024;

/// Agent-side ends of the mock's video and control streams.
pub struct MockAgentHandles {
    /// Peer of the first socket the session opens (the video stream).
    pub video: DuplexStream,
    /// Peer of the second socket the session opens (the control stream).
    pub control: DuplexStream,
}

struct MockInner {
    sockets: VecDeque<DuplexStream>,
    pushes: Vec<(PathBuf, String)>,
    shell_commands: Vec<Vec<String>>,
    shell_peers: Vec<DuplexStream>,
    refuse_sockets: bool,
}

/// Scripted [`DeviceTransport`] backed by in-memory duplex streams.
pub struct MockTransport {
    banner: String,
    inner: Mutex<MockInner>,
}

impl MockTransport {
    /// Creates a transport whose shell streams emit `banner` on startup.
    ///
    /// Returns the transport together with the agent-side stream ends.
    pub fn new(banner: &str) -> (std::sync::Arc<Self>, MockAgentHandles) {
        let (video_local, video_peer) = duplex(STREAM_BUFFER);
        let (control_local, control_peer) = duplex(STREAM_BUFFER);

        let transport = std::sync::Arc::new(Self {
            banner: banner.to_string(),
            inner: Mutex::new(MockInner {
                sockets: VecDeque::from([video_local, control_local]),
                pushes: Vec::new(),
                shell_commands: Vec::new(),
                shell_peers: Vec::new(),
                refuse_sockets: false,
            }),
        });
        let handles = MockAgentHandles {
            video: video_peer,
            control: control_peer,
        };
        (transport, handles)
    }

    /// Makes every subsequent `open_socket` fail with connection refused.
    pub fn refuse_sockets(&self) {
        self.lock().refuse_sockets = true;
    }

    /// Every `(local, remote)` pair pushed so far.
    pub fn pushes(&self) -> Vec<(PathBuf, String)> {
        self.lock().pushes.clone()
    }

    /// Every shell command started so far.
    pub fn shell_commands(&self) -> Vec<Vec<String>> {
        self.lock().shell_commands.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn push(&self, local: &Path, remote: &str) -> Result<(), TransportError> {
        self.lock().pushes.push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    async fn shell(&self, command: &[String]) -> Result<BoxedStream, TransportError> {
        let (local, mut peer) = duplex(STREAM_BUFFER);
        peer.write_all(self.banner.as_bytes())
            .await
            .map_err(|source| TransportError::Shell { source })?;

        let mut inner = self.lock();
        inner.shell_commands.push(command.to_vec());
        // Keep the peer end alive so the shell stream does not see EOF.
        inner.shell_peers.push(peer);
        Ok(Box::new(local))
    }

    async fn open_socket(&self, name: &str) -> Result<BoxedStream, TransportError> {
        let mut inner = self.lock();
        if inner.refuse_sockets {
            return Err(TransportError::OpenSocket {
                name: name.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "mock transport configured to refuse connections",
                ),
            });
        }
        match inner.sockets.pop_front() {
            Some(stream) => Ok(Box::new(stream)),
            None => Err(TransportError::OpenSocket {
                name: name.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "no scripted streams remaining",
                ),
            }),
        }
    }
}
