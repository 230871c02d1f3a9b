//! Integration tests for the session lifecycle over a mock transport.
//!
//! These tests exercise `Session` through its public API the way a
//! frontend would, with the test playing the on-device agent:
//!
//! ```text
//! Test (agent side)                   Session
//! ─────────────────                   ───────
//! write 0x00 on video peer            start()
//!                                       push + shell (recorded by mock)
//!                                       open video stream, open control stream
//!                                       read handshake byte → Streaming
//! write video bytes                     decoder yields frames,
//!                                       resolution latches, events fire
//! read control peer                     touch()/tap()/swipe() bytes on the wire
//! reply to clipboard request            get_clipboard() returns text
//! drop video peer                       Disconnect event, session Stopped
//! ```
//!
//! The stub decoder turns every chunk into one 1080x2400 frame, so a single
//! write on the video peer is enough to latch the stream resolution.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use tapcast_client::transport::mock::{MockAgentHandles, MockTransport};
use tapcast_client::transport::DeviceTransport;
use tapcast_client::{
    ClientError, EventKind, Frame, RunMode, Session, SessionEvent, SessionOptions, SessionState,
    VideoDecoder,
};
use tapcast_core::encode_message;
use tapcast_core::protocol::messages::{
    ControlMessage, KeyEventAction, TouchAction, DEVICE_MSG_TYPE_CLIPBOARD, POINTER_ID_MOUSE,
};

const BANNER: &str = "[agent] INFO: Device: Pixel 7 (Android 14)\n";
const TOUCH_EVENT_LEN: usize = 32;

/// Turns every fed chunk into one fixed-size frame.
struct StubDecoder;

impl VideoDecoder for StubDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, String> {
        Ok(vec![Frame {
            width: 1080,
            height: 2400,
            data: chunk.to_vec(),
        }])
    }
}

fn test_options() -> SessionOptions {
    SessionOptions {
        agent_package: Some("/tmp/tapcast-agent.jar".into()),
        connection_timeout_ms: 1_000,
        block_frame: true,
        ..SessionOptions::default()
    }
}

/// Starts a background session against a fresh mock transport, acking the
/// handshake up front.
async fn start_session(
    options: SessionOptions,
) -> (Arc<Session>, Arc<MockTransport>, MockAgentHandles) {
    let (transport, mut handles) = MockTransport::new(BANNER);
    let session = Arc::new(Session::new(options));
    handles.video.write_all(&[0x00]).await.unwrap();
    session
        .start(
            Arc::clone(&transport) as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await
        .expect("session start");
    (session, transport, handles)
}

/// Polls until `predicate` holds or the deadline passes.
async fn wait_until(mut predicate: impl FnMut() -> bool, deadline: Duration) {
    let start = std::time::Instant::now();
    while !predicate() {
        assert!(
            start.elapsed() < deadline,
            "condition not reached within {deadline:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_deploys_agent_and_reaches_streaming() {
    // Arrange / Act
    let (session, transport, mut handles) = start_session(test_options()).await;

    // Assert – deployment went through the transport
    assert_eq!(
        transport.pushes(),
        vec![(
            "/tmp/tapcast-agent.jar".into(),
            "/data/local/tmp/tapcast-agent.jar".to_string()
        )]
    );
    let shells = transport.shell_commands();
    assert_eq!(shells.len(), 1);
    assert!(shells[0][0].starts_with("CLASSPATH="));
    assert_eq!(shells[0][1], "app_process");

    // The banner supplied the device name, and streaming began
    assert_eq!(session.state(), SessionState::Streaming);
    assert!(session.is_alive());
    assert_eq!(session.device_name().as_deref(), Some("Pixel 7 (Android 14)"));

    // A video chunk latches the resolution and lands in the mailbox
    handles.video.write_all(&[1, 2, 3]).await.unwrap();
    let resolution = session.wait_for_resolution(Duration::from_secs(1)).await.unwrap();
    assert_eq!(resolution, (1080, 2400));
    let frame = session.frames().latest().expect("latest frame");
    assert_eq!(frame.data, vec![1, 2, 3]);

    session.stop().await;
}

#[tokio::test]
async fn test_start_without_agent_package_skips_deployment() {
    // Arrange
    let options = SessionOptions {
        agent_package: None,
        ..test_options()
    };

    // Act
    let (session, transport, _handles) = start_session(options).await;

    // Assert
    assert!(transport.pushes().is_empty());
    assert!(transport.shell_commands().is_empty());
    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(session.device_name(), None);

    session.stop().await;
}

#[tokio::test]
async fn test_start_twice_is_a_precondition_error() {
    // Arrange
    let (session, _transport, _handles) = start_session(test_options()).await;
    let (second_transport, _second_handles) = MockTransport::new(BANNER);

    // Act
    let result = session
        .start(
            second_transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await;

    // Assert
    assert!(matches!(result, Err(ClientError::Precondition(_))));

    session.stop().await;
}

#[tokio::test]
async fn test_unreachable_agent_moves_session_to_failed() {
    // Arrange – every socket open is refused, and a short deadline keeps
    // the retry loop from dragging the test out
    let (transport, _handles) = MockTransport::new(BANNER);
    transport.refuse_sockets();
    let options = SessionOptions {
        agent_package: None,
        connection_timeout_ms: 300,
        ..SessionOptions::default()
    };
    let session = Arc::new(Session::new(options));

    // Act
    let result = session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await;

    // Assert
    assert!(matches!(result, Err(ClientError::Connection(_))));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(!session.is_alive());
}

#[tokio::test]
async fn test_bad_handshake_byte_fails_startup() {
    // Arrange – the agent sends garbage instead of the zero ack
    let (transport, mut handles) = MockTransport::new(BANNER);
    handles.video.write_all(&[0xff]).await.unwrap();
    let session = Arc::new(Session::new(test_options()));

    // Act
    let result = session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await;

    // Assert
    assert!(matches!(result, Err(ClientError::Protocol(_))));
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_failed_startup_rejects_control_commands() {
    // Arrange – the control socket opens, then the handshake byte is wrong
    let (transport, mut handles) = MockTransport::new(BANNER);
    handles.video.write_all(&[0xff]).await.unwrap();
    let session = Arc::new(Session::new(test_options()));
    session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await
        .unwrap_err();
    assert_eq!(session.state(), SessionState::Failed);

    // Act – commands against a failed session must not reach the wire
    let result = session.inject_text("oops").await;

    // Assert
    assert!(matches!(result, Err(ClientError::Precondition(_))));
}

// ── Events ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_events_fire_init_then_frames_then_disconnect() {
    // Arrange – record event kinds before starting
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let session = Arc::new(Session::new(test_options()));
    for (kind, label) in [
        (EventKind::Init, "init"),
        (EventKind::Frame, "frame"),
        (EventKind::Disconnect, "disconnect"),
    ] {
        let sink = Arc::clone(&events);
        session.listeners().subscribe(kind, move |_| {
            sink.lock().unwrap().push(label);
        });
    }

    let (transport, mut handles) = MockTransport::new(BANNER);
    handles.video.write_all(&[0x00]).await.unwrap();
    session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await
        .unwrap();

    // Act – one frame, then the agent closes the stream
    handles.video.write_all(&[9]).await.unwrap();
    session.wait_for_resolution(Duration::from_secs(1)).await.unwrap();
    drop(handles.video);
    {
        let session = Arc::clone(&session);
        wait_until(move || session.state() == SessionState::Stopped, Duration::from_secs(1)).await;
    }

    // Assert – Init first, at least one Frame, Disconnect last
    let recorded = events.lock().unwrap().clone();
    assert_eq!(recorded.first(), Some(&"init"));
    assert_eq!(recorded.last(), Some(&"disconnect"));
    assert!(recorded.contains(&"frame"));
    assert_eq!(recorded.iter().filter(|e| **e == "disconnect").count(), 1);
}

#[tokio::test]
async fn test_frame_listeners_receive_the_decoded_frame() {
    // Arrange
    let seen = Arc::new(Mutex::new(None));
    let session = Arc::new(Session::new(test_options()));
    let sink = Arc::clone(&seen);
    session.listeners().subscribe(EventKind::Frame, move |event| {
        if let SessionEvent::Frame(Some(frame)) = event {
            *sink.lock().unwrap() = Some(frame.data.clone());
        }
    });

    let (transport, mut handles) = MockTransport::new(BANNER);
    handles.video.write_all(&[0x00]).await.unwrap();
    session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await
        .unwrap();

    // Act
    handles.video.write_all(&[7, 7, 7]).await.unwrap();
    {
        let seen = Arc::clone(&seen);
        wait_until(move || seen.lock().unwrap().is_some(), Duration::from_secs(1)).await;
    }

    // Assert
    assert_eq!(seen.lock().unwrap().clone(), Some(vec![7, 7, 7]));
    session.stop().await;
}

// ── Control operations ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_touch_bytes_reach_the_control_stream() {
    // Arrange
    let (session, _transport, mut handles) = start_session(test_options()).await;
    handles.video.write_all(&[1]).await.unwrap();
    session.wait_for_resolution(Duration::from_secs(1)).await.unwrap();

    // Act
    let sent = session.touch(100, 200, TouchAction::Down).await.unwrap();

    // Assert – the exact encoded message arrives on the agent side
    let expected = encode_message(&ControlMessage::InjectTouch {
        action: TouchAction::Down,
        pointer_id: POINTER_ID_MOUSE,
        x: 100,
        y: 200,
        width: 1080,
        height: 2400,
        pressure: 1.0,
    })
    .unwrap();
    assert_eq!(sent, expected);

    let mut wire = vec![0u8; expected.len()];
    handles.control.read_exact(&mut wire).await.unwrap();
    assert_eq!(wire, expected);

    session.stop().await;
}

#[tokio::test]
async fn test_keycode_does_not_require_resolution() {
    // Arrange – no video data, so the resolution is still unknown
    let (session, _transport, mut handles) = start_session(test_options()).await;

    // Act
    let sent = session
        .keycode(
            tapcast_core::protocol::android::keycode::AKEYCODE_HOME,
            KeyEventAction::Down,
            0,
            0,
        )
        .await
        .unwrap();

    // Assert
    let mut wire = vec![0u8; sent.len()];
    handles.control.read_exact(&mut wire).await.unwrap();
    assert_eq!(wire, sent);

    session.stop().await;
}

#[tokio::test]
async fn test_touch_before_resolution_is_a_precondition_error() {
    // Arrange – handshake done, but no frame decoded yet
    let (session, _transport, _handles) = start_session(test_options()).await;

    // Act
    let result = session.touch(10, 10, TouchAction::Down).await;

    // Assert
    assert!(matches!(result, Err(ClientError::Precondition(_))));

    session.stop().await;
}

#[tokio::test]
async fn test_tap_emits_touch_down_then_up() {
    // Arrange
    let (session, _transport, mut handles) = start_session(test_options()).await;
    handles.video.write_all(&[1]).await.unwrap();
    session.wait_for_resolution(Duration::from_secs(1)).await.unwrap();

    // Act
    session.tap(10, 20, Duration::from_millis(5)).await.unwrap();

    // Assert – exactly two touch events, down then up, at the same point
    let mut wire = vec![0u8; 2 * TOUCH_EVENT_LEN];
    handles.control.read_exact(&mut wire).await.unwrap();
    let (down, up) = wire.split_at(TOUCH_EVENT_LEN);
    assert_eq!(down[0], 0x02); // InjectTouch tag
    assert_eq!(down[1], TouchAction::Down as u8);
    assert_eq!(up[0], 0x02);
    assert_eq!(up[1], TouchAction::Up as u8);
    assert_eq!(down[10..18], up[10..18]); // same x and y

    session.stop().await;
}

#[tokio::test]
async fn test_swipe_emits_expected_touch_sequence() {
    // Arrange
    let (session, _transport, mut handles) = start_session(test_options()).await;
    handles.video.write_all(&[1]).await.unwrap();
    session.wait_for_resolution(Duration::from_secs(1)).await.unwrap();

    // Act – 100px swipe in 20px steps: down + 4 moves + up
    session
        .swipe(
            (0, 0),
            (0, 100),
            Duration::from_millis(1),
            20,
            Duration::from_millis(1),
        )
        .await
        .unwrap();

    // Assert
    let mut wire = vec![0u8; 6 * TOUCH_EVENT_LEN];
    handles.control.read_exact(&mut wire).await.unwrap();
    let events: Vec<&[u8]> = wire.chunks(TOUCH_EVENT_LEN).collect();
    assert_eq!(events[0][1], TouchAction::Down as u8);
    for event in &events[1..5] {
        assert_eq!(event[1], TouchAction::Move as u8);
    }
    let last = events[5];
    assert_eq!(last[1], TouchAction::Up as u8);
    // y lives at bytes 14..18 of a touch event; the up lands on the endpoint
    let y = i32::from_be_bytes(last[14..18].try_into().unwrap());
    assert_eq!(y, 100);

    session.stop().await;
}

// ── Clipboard ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_clipboard_get_round_trips_through_the_agent() {
    // Arrange
    let (session, _transport, mut handles) = start_session(test_options()).await;
    let agent = tokio::spawn(async move {
        // Serve the copy request with a clipboard device message.
        let mut request = [0u8; 2];
        handles.control.read_exact(&mut request).await.unwrap();
        assert_eq!(request[0], 0x08); // GetClipboard tag

        let text = b"from device";
        let mut response = vec![DEVICE_MSG_TYPE_CLIPBOARD];
        response.extend_from_slice(&(text.len() as i32).to_be_bytes());
        response.extend_from_slice(text);
        handles.control.write_all(&response).await.unwrap();
        handles
    });

    // Act
    let text = session.get_clipboard().await.unwrap();

    // Assert
    assert_eq!(text, "from device");
    agent.await.unwrap();
    session.stop().await;
}

#[tokio::test]
async fn test_clipboard_set_writes_sequenced_message() {
    // Arrange
    let (session, _transport, mut handles) = start_session(test_options()).await;

    // Act
    let first = session.set_clipboard("alpha", false).await.unwrap();
    let second = session.set_clipboard("beta", true).await.unwrap();

    // Assert – requests carry sequence 1 and 2 respectively
    assert_eq!(
        first,
        encode_message(&ControlMessage::SetClipboard {
            sequence: 1,
            text: "alpha".to_string(),
            paste: false,
        })
        .unwrap()
    );
    assert_eq!(
        second,
        encode_message(&ControlMessage::SetClipboard {
            sequence: 2,
            text: "beta".to_string(),
            paste: true,
        })
        .unwrap()
    );

    let mut wire = vec![0u8; first.len() + second.len()];
    handles.control.read_exact(&mut wire).await.unwrap();
    assert_eq!(&wire[..first.len()], &first[..]);
    assert_eq!(&wire[first.len()..], &second[..]);

    session.stop().await;
}

// ── Shutdown ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_is_idempotent_and_blocks_further_commands() {
    // Arrange
    let (session, _transport, _handles) = start_session(test_options()).await;

    // Act
    session.stop().await;
    session.stop().await;

    // Assert
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(!session.is_alive());
    let result = session.inject_text("too late").await;
    assert!(matches!(result, Err(ClientError::Precondition(_))));
}

#[tokio::test]
async fn test_stopped_session_cannot_be_restarted() {
    // Arrange
    let (session, _transport, _handles) = start_session(test_options()).await;
    session.stop().await;

    // Act
    let (transport, _handles2) = MockTransport::new(BANNER);
    let result = session
        .start(
            transport as Arc<dyn DeviceTransport>,
            Box::new(StubDecoder),
            RunMode::Background,
        )
        .await;

    // Assert
    assert!(matches!(result, Err(ClientError::Precondition(_))));
}
