//! Session lifecycle and the video frame-ingestion loop.
//!
//! A [`Session`] walks a one-way state machine:
//!
//! ```text
//! Idle → Deploying → Handshaking → Streaming → Stopped
//!            └────────────┴──→ Failed
//! ```
//!
//! Starting deploys the agent (unless it is already running), opens the
//! video and control streams, performs the handshake, and then drives the
//! frame loop either on the calling task (foreground) or a spawned one
//! (background).  Stopping is always safe and idempotent.

pub mod control;
pub mod mailbox;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};
use std::time::Duration;

use tapcast_core::ClipboardSequence;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clipboard::{ClipboardChannel, SharedControlSocket};
use crate::config::SessionOptions;
use crate::error::ClientError;
use crate::listener::{ListenerRegistry, SessionEvent};
use crate::session::mailbox::FrameMailbox;
use crate::transport::{BoxedStream, DeviceTransport};
use crate::video::{Frame, VideoDecoder};

/// Abstract socket name the agent listens on.
pub const SOCKET_NAME: &str = "tapcast";
/// Where the agent package lands on the device.
pub const AGENT_REMOTE_PATH: &str = "/data/local/tmp/tapcast-agent.jar";
/// Entry point class inside the agent package.
pub const AGENT_MAIN_CLASS: &str = "com.tapcast.Agent";
/// Agent version pinned to this client build.
pub const AGENT_VERSION: &str = "0.1.0";

/// Interval between attempts to reach the agent socket during startup.
const CONNECT_RETRY: Duration = Duration::from_millis(200);
/// Frame-loop poll tick; doubles as the heartbeat cadence when no video
/// data is arriving.
const FRAME_POLL: Duration = Duration::from_millis(10);
/// Polling interval for [`Session::wait_for_resolution`].
const RESOLUTION_POLL: Duration = Duration::from_millis(50);

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created; `start` has not been called.
    Idle,
    /// Pushing and launching the agent.
    Deploying,
    /// Opening streams and reading the handshake byte.
    Handshaking,
    /// Frame loop running; control operations available.
    Streaming,
    /// Terminated by `stop` or stream end.
    Stopped,
    /// Startup failed; the session cannot be restarted.
    Failed,
}

/// Whether `start` drives the frame loop itself or hands it to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// `start` returns only when the stream ends.
    Foreground,
    /// `start` returns once streaming begins; the frame loop runs on a
    /// spawned task.
    Background,
}

/// A remote-control session against one device.
pub struct Session {
    options: SessionOptions,
    session_id: Uuid,
    state: StdMutex<SessionState>,
    alive: AtomicBool,
    resolution: OnceLock<(u16, u16)>,
    device_name: StdMutex<Option<String>>,
    control_socket: SharedControlSocket,
    agent_shell: Mutex<Option<BoxedStream>>,
    mailbox: FrameMailbox,
    listeners: ListenerRegistry,
    clipboard: ClipboardChannel,
}

impl Session {
    /// Creates an idle session.  Call [`Session::start`] to connect.
    pub fn new(options: SessionOptions) -> Self {
        let control_socket: SharedControlSocket = Arc::new(Mutex::new(None));
        let clipboard = ClipboardChannel::new(
            Arc::clone(&control_socket),
            Arc::new(ClipboardSequence::new()),
        );
        Self {
            options,
            session_id: Uuid::new_v4(),
            state: StdMutex::new(SessionState::Idle),
            alive: AtomicBool::new(false),
            resolution: OnceLock::new(),
            device_name: StdMutex::new(None),
            control_socket,
            agent_shell: Mutex::new(None),
            mailbox: FrameMailbox::new(),
            listeners: ListenerRegistry::new(),
            clipboard,
        }
    }

    /// Unique identifier of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `true` while the frame loop is expected to keep running.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Dimensions of the first decoded frame, once known.
    ///
    /// Latches exactly once per session; mid-stream rotation does not
    /// update it.
    pub fn resolution(&self) -> Option<(u16, u16)> {
        self.resolution.get().copied()
    }

    /// Device model name parsed from the agent's startup banner.
    pub fn device_name(&self) -> Option<String> {
        self.device_name
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The latest-frame mailbox.
    pub fn frames(&self) -> &FrameMailbox {
        &self.mailbox
    }

    /// The event listener registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// The clipboard channel.
    pub fn clipboard(&self) -> &ClipboardChannel {
        &self.clipboard
    }

    /// Connects to the device and begins streaming.
    ///
    /// In [`RunMode::Foreground`] this returns when the stream ends; in
    /// [`RunMode::Background`] it returns as soon as streaming starts.
    ///
    /// # Errors
    ///
    /// [`ClientError::Precondition`] when the session is not idle; any
    /// startup failure moves the session to [`SessionState::Failed`] and
    /// is returned.
    pub async fn start(
        self: &Arc<Self>,
        transport: Arc<dyn DeviceTransport>,
        decoder: Box<dyn VideoDecoder>,
        mode: RunMode,
    ) -> Result<(), ClientError> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != SessionState::Idle {
                return Err(ClientError::Precondition(
                    "start requires an idle session",
                ));
            }
            *state = SessionState::Deploying;
        }

        let video_socket = match self.connect(transport.as_ref()).await {
            Ok(socket) => socket,
            Err(e) => {
                error!(session = %self.session_id, "session startup failed: {e}");
                // Any stream opened before the failure must not outlive it;
                // a half-connected control socket would accept commands
                // against a dead session.
                self.close_streams().await;
                self.set_state(SessionState::Failed);
                return Err(e);
            }
        };

        self.alive.store(true, Ordering::SeqCst);
        self.set_state(SessionState::Streaming);
        info!(session = %self.session_id, "session streaming");
        self.listeners.dispatch(&SessionEvent::Init);

        match mode {
            RunMode::Foreground => self.frame_loop(video_socket, decoder).await,
            RunMode::Background => {
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(e) = this.frame_loop(video_socket, decoder).await {
                        error!(session = %this.session_id, "frame loop ended: {e}");
                    }
                });
                Ok(())
            }
        }
    }

    /// Stops the session and closes its streams.
    ///
    /// Safe to call in any state, any number of times.  The frame loop
    /// notices the stop at its next poll tick.
    pub async fn stop(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.teardown().await;
        debug!(session = %self.session_id, "session stopped");
    }

    /// Waits until the first frame has latched the stream resolution.
    ///
    /// # Errors
    ///
    /// [`ClientError::Timeout`] when no frame decodes within `timeout`.
    pub async fn wait_for_resolution(
        &self,
        timeout: Duration,
    ) -> Result<(u16, u16), ClientError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(resolution) = self.resolution.get() {
                return Ok(*resolution);
            }
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout("first decoded frame"));
            }
            time::sleep(RESOLUTION_POLL).await;
        }
    }

    // ── Startup ───────────────────────────────────────────────────────────────

    /// Deploys the agent (if configured), opens both streams, and performs
    /// the handshake.  Returns the video stream.
    async fn connect(
        &self,
        transport: &dyn DeviceTransport,
    ) -> Result<BoxedStream, ClientError> {
        let timeout = self.options.connection_timeout();

        if let Some(package) = self.options.agent_package.clone() {
            self.deploy(transport, &package).await?;
        } else {
            debug!(session = %self.session_id, "no agent package configured; assuming agent is running");
        }
        self.set_state(SessionState::Handshaking);

        // The agent's socket appears some time after launch; retry the
        // first open until the connection deadline.
        let deadline = Instant::now() + timeout;
        let mut video = loop {
            match transport.open_socket(SOCKET_NAME).await {
                Ok(socket) => break socket,
                Err(e) => {
                    if Instant::now() + CONNECT_RETRY >= deadline {
                        return Err(ClientError::Connection(format!(
                            "agent socket unreachable after {}ms: {e}",
                            timeout.as_millis()
                        )));
                    }
                    time::sleep(CONNECT_RETRY).await;
                }
            }
        };
        let control = transport.open_socket(SOCKET_NAME).await?;
        *self.control_socket.lock().await = Some(control);

        // The agent acknowledges a live video stream with a single zero
        // byte before any video data.
        let dummy = time::timeout(timeout, video.read_u8())
            .await
            .map_err(|_| ClientError::Timeout("handshake byte"))?
            .map_err(|source| ClientError::Io {
                context: "video stream handshake",
                source,
            })?;
        if dummy != 0x00 {
            return Err(ClientError::Protocol(
                tapcast_core::ProtocolError::UnexpectedTag(dummy),
            ));
        }
        debug!(session = %self.session_id, "handshake complete");
        Ok(video)
    }

    /// Pushes the agent package, launches it, and waits for its banner.
    async fn deploy(
        &self,
        transport: &dyn DeviceTransport,
        package: &Path,
    ) -> Result<(), ClientError> {
        transport.push(package, AGENT_REMOTE_PATH).await?;

        let command = build_agent_command(&self.options);
        debug!(session = %self.session_id, ?command, "launching agent");
        let mut shell = transport.shell(&command).await?;

        let banner =
            match time::timeout(self.options.connection_timeout(), read_banner(&mut shell))
                .await
            {
                Ok(read) => read.map_err(|source| ClientError::Io {
                    context: "agent shell stream",
                    source,
                })?,
                Err(_) => {
                    warn!(session = %self.session_id, "agent banner did not arrive in time; continuing");
                    String::new()
                }
            };
        if let Some(name) = parse_device_name(&banner) {
            info!(session = %self.session_id, device = %name, "agent started");
            *self.device_name.lock().unwrap_or_else(|e| e.into_inner()) = Some(name);
        }

        // Keep the shell stream open; dropping it would kill the agent on
        // transports that tie process lifetime to the stream.
        *self.agent_shell.lock().await = Some(shell);
        Ok(())
    }

    // ── Frame loop ────────────────────────────────────────────────────────────

    /// Reads the video stream until the session stops or the stream ends.
    async fn frame_loop(
        &self,
        mut video: BoxedStream,
        mut decoder: Box<dyn VideoDecoder>,
    ) -> Result<(), ClientError> {
        let mut buf = vec![0u8; 0x10000];
        loop {
            if !self.alive.load(Ordering::Relaxed) {
                // stop() already tore the session down.
                return Ok(());
            }
            match time::timeout(FRAME_POLL, video.read(&mut buf)).await {
                Ok(Ok(0)) => {
                    return self
                        .fail_stream(ClientError::Connection(
                            "video stream closed by agent".to_string(),
                        ))
                        .await;
                }
                Ok(Ok(n)) => match decoder.feed(&buf[..n]) {
                    Ok(frames) => {
                        for frame in frames {
                            self.publish_frame(frame);
                        }
                    }
                    Err(e) => {
                        warn!(session = %self.session_id, "decoder rejected chunk: {e}");
                    }
                },
                Ok(Err(source)) => {
                    return self
                        .fail_stream(ClientError::Io {
                            context: "video stream read",
                            source,
                        })
                        .await;
                }
                Err(_) => {
                    // No data this tick; emit a heartbeat unless suppressed.
                    if !self.options.block_frame {
                        self.listeners.dispatch(&SessionEvent::Frame(None));
                    }
                }
            }
        }
    }

    /// Publishes one decoded frame to the mailbox and listeners.
    fn publish_frame(&self, frame: Frame) {
        let frame = Arc::new(frame);
        if self.resolution.set((frame.width, frame.height)).is_ok() {
            info!(
                session = %self.session_id,
                width = frame.width,
                height = frame.height,
                "stream resolution latched"
            );
        }
        if !self.mailbox.try_publish(Arc::clone(&frame)) {
            debug!(session = %self.session_id, "latest-frame slot busy; frame dropped");
        }
        self.listeners.dispatch(&SessionEvent::Frame(Some(frame)));
    }

    /// Handles an unexpected stream end from inside the frame loop.
    async fn fail_stream(&self, error: ClientError) -> Result<(), ClientError> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            // A concurrent stop() won the race; not a failure.
            return Ok(());
        }
        warn!(session = %self.session_id, "stream ended: {error}");
        self.listeners.dispatch(&SessionEvent::Disconnect);
        self.teardown().await;
        Err(error)
    }

    /// Closes both agent streams and marks the session stopped.
    async fn teardown(&self) {
        self.set_state(SessionState::Stopped);
        self.close_streams().await;
    }

    /// Drops both agent streams.  Dropping a stream closes it; close
    /// errors are ignored.
    async fn close_streams(&self) {
        self.control_socket.lock().await.take();
        self.agent_shell.lock().await.take();
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

/// Builds the device-side command line that launches the agent.
fn build_agent_command(options: &SessionOptions) -> Vec<String> {
    let mut command = vec![
        format!("CLASSPATH={AGENT_REMOTE_PATH}"),
        "app_process".to_string(),
        "/".to_string(),
        AGENT_MAIN_CLASS.to_string(),
        AGENT_VERSION.to_string(),
        "log_level=info".to_string(),
        "tunnel_forward=true".to_string(),
        "video=true".to_string(),
        "audio=false".to_string(),
        "control=true".to_string(),
        "clipboard_autosync=false".to_string(),
        format!("stay_awake={}", options.stay_awake),
        "raw_stream=true".to_string(),
        "power_off_on_close=false".to_string(),
    ];
    if options.max_size > 0 {
        command.push(format!("max_size={}", options.max_size));
    }
    if options.max_fps > 0 {
        command.push(format!("max_fps={}", options.max_fps));
    }
    if options.bit_rate > 0 {
        command.push(format!("video_bit_rate={}", options.bit_rate));
    }
    command
}

/// Reads the agent's startup output until a full informational line has
/// arrived (or the stream ends).
async fn read_banner(stream: &mut BoxedStream) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buffer);
        if text.contains('\n') && text.contains("INFO") {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Pulls the device model name out of the agent banner.
///
/// The agent prints a line like `[agent] INFO: Device: Pixel 7` on startup.
fn parse_device_name(banner: &str) -> Option<String> {
    banner.lines().find_map(|line| {
        line.split_once("Device:")
            .map(|(_, name)| name.trim().to_string())
    })
}
