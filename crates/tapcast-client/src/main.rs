//! tapcast demo binary.
//!
//! Connects a session over a pre-forwarded TCP port and logs stream
//! statistics until Ctrl-C.  The video decoder here only counts bytes; a
//! real frontend plugs in a hardware decoder and a renderer behind the
//! same [`VideoDecoder`] seam.
//!
//! Usage:
//!
//! ```text
//! adb forward tcp:27183 localabstract:tapcast
//! tapcast [ADDR]              # default 127.0.0.1:27183
//! TAPCAST_CONFIG=opts.toml tapcast
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tapcast_client::transport::tcp::TcpTransport;
use tapcast_client::{
    EventKind, Frame, RunMode, Session, SessionEvent, SessionOptions, VideoDecoder,
};

/// Decoder stub that discards video bytes.
///
/// Never yields frames, so the resolution never latches and
/// position-carrying commands stay unavailable.  Good enough to observe a
/// live stream.
#[derive(Default)]
struct DiscardDecoder {
    bytes: u64,
}

impl VideoDecoder for DiscardDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, String> {
        self.bytes += chunk.len() as u64;
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:27183".to_string())
        .parse()
        .context("invalid agent address")?;

    let options = match std::env::var_os("TAPCAST_CONFIG") {
        Some(path) => SessionOptions::load(Path::new(&path))
            .context("could not load session options")?,
        None => SessionOptions::default(),
    };

    if options.agent_package.is_some() {
        warn!("agent_package is ignored over a forwarded port; deploy the agent out of band");
    }

    info!(%addr, "tapcast starting");

    let session = Arc::new(Session::new(SessionOptions {
        agent_package: None,
        ..options
    }));

    // Count frame events so the stats loop can report a rate.
    let frames = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&frames);
    session.listeners().subscribe(EventKind::Frame, move |event| {
        if let SessionEvent::Frame(Some(_)) = event {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });
    session.listeners().subscribe(EventKind::Disconnect, |_| {
        warn!("stream disconnected");
    });

    let transport = Arc::new(TcpTransport::new(addr));
    session
        .start(transport, Box::new(DiscardDecoder::default()), RunMode::Background)
        .await?;

    // ── Stats loop until Ctrl-C ───────────────────────────────────────────────
    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    ticker.tick().await; // the first tick fires immediately
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!(
                    state = ?session.state(),
                    frames = frames.load(Ordering::Relaxed),
                    resolution = ?session.resolution(),
                    "session stats"
                );
                if !session.is_alive() {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("shutdown signal received");
                break;
            }
        }
    }

    session.stop().await;
    info!("tapcast stopped");
    Ok(())
}
