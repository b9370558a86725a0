//! Integration tests exercising the full daemon over a real Unix socket.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use thumb_gesture_daemon::config::{Config, DaemonConfig, GestureConfig};
use thumb_gesture_daemon::state::ListenerState;
use thumb_gesture_daemon::{Daemon, DaemonError, DaemonStatus, ShutdownHandle};
use thumb_gesture_input::mock::{mock_backends, MockInputHandle};
use thumb_gesture_input::InputError;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Everything needed to drive one daemon under test.
struct TestDaemon {
    socket: PathBuf,
    input: MockInputHandle,
    status: watch::Receiver<DaemonStatus>,
    shutdown: ShutdownHandle,
    handle: tokio::task::JoinHandle<Result<(), DaemonError>>,
}

impl TestDaemon {
    async fn connect(&self) -> UnixStream {
        UnixStream::connect(&self.socket)
            .await
            .expect("daemon should accept connections")
    }

    async fn stop(self) -> Result<(), DaemonError> {
        self.shutdown.shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("daemon should stop")
            .expect("daemon task should not panic")
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn socket_path(name: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "thumb-gesture-it-{}-{n}-{name}.sock",
        std::process::id()
    ))
}

fn test_config(socket: PathBuf, release_delay_ms: u64) -> Config {
    Config {
        daemon: DaemonConfig {
            socket_path: socket,
            ..DaemonConfig::default()
        },
        gesture: GestureConfig {
            release_delay_ms,
            ..GestureConfig::default()
        },
        ..Config::default()
    }
}

/// Start a daemon with mock output channels and wait until it listens.
async fn start_daemon(socket: PathBuf, release_delay_ms: u64) -> TestDaemon {
    init_tracing();
    let (injector, pointer, input) = mock_backends();
    let mut daemon = Daemon::new(
        test_config(socket.clone(), release_delay_ms),
        Box::new(injector),
        Box::new(pointer),
    );
    let mut status = daemon.status_receiver();
    let shutdown = daemon.shutdown_handle();
    let handle = tokio::spawn(async move { daemon.run().await });

    wait_for_status(&mut status, Duration::from_secs(5), |s| {
        s.listener == ListenerState::Listening
    })
    .await
    .expect("daemon should start listening");

    TestDaemon {
        socket,
        input,
        status,
        shutdown,
        handle,
    }
}

/// Wait for a condition on a status receiver with timeout.
async fn wait_for_status(
    rx: &mut watch::Receiver<DaemonStatus>,
    timeout: Duration,
    pred: impl Fn(&DaemonStatus) -> bool,
) -> Result<DaemonStatus, &'static str> {
    tokio::time::timeout(timeout, async {
        loop {
            {
                let status = rx.borrow_and_update().clone();
                if pred(&status) {
                    return Ok(status);
                }
            }
            if rx.changed().await.is_err() {
                return Err("watch closed");
            }
        }
    })
    .await
    .map_err(|_| "timeout")?
}

/// Poll the mock input until `pred` holds.
async fn wait_for_input(
    input: &MockInputHandle,
    pred: impl Fn(&MockInputHandle) -> bool,
) -> Result<(), &'static str> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !pred(input) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| "timeout")
}

#[tokio::test]
async fn test_mixed_lines_skip_malformed() {
    let mut daemon = start_daemon(socket_path("mixed"), 1000).await;
    let mut stream = daemon.connect().await;

    stream
        .write_all(b"left:5\nup:3\nright:2\ngarbage\nleft:abc\n\nright:0\nright:1\n")
        .await
        .unwrap();

    let status = wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
        s.events_handled == 3 && s.malformed_lines == 4
    })
    .await
    .expect("every line should be processed");
    assert_eq!(status.connections_accepted, 1);
    assert_eq!(daemon.input.moves(), vec![-150, 60, 30]);

    // The connection survives malformed lines.
    stream.write_all(b"left:1\n").await.unwrap();
    wait_for_input(&daemon.input, |input| input.moves().len() == 4)
        .await
        .expect("connection should stay open");
    assert_eq!(daemon.input.moves(), vec![-150, 60, 30, -30]);
    assert_eq!(daemon.input.gesture_starts(), 1);

    drop(stream);
    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_malformed_only_never_touches_gesture() {
    let mut daemon = start_daemon(socket_path("malformed"), 100).await;
    let mut stream = daemon.connect().await;

    stream.write_all(b"up:3\n").await.unwrap();
    wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
        s.malformed_lines == 1
    })
    .await
    .expect("malformed line should be counted");

    assert!(daemon.input.actions().is_empty());
    assert!(!daemon.status.borrow().gesture_active);

    drop(stream);
    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_partial_messages_across_writes() {
    let daemon = start_daemon(socket_path("partial"), 1000).await;
    let mut stream = daemon.connect().await;

    for chunk in [&b"lef"[..], b"t:4\nri", b"ght:", b"1\n"] {
        stream.write_all(chunk).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    wait_for_input(&daemon.input, |input| input.moves().len() == 2)
        .await
        .expect("both messages should arrive");
    assert_eq!(daemon.input.moves(), vec![-120, 30]);

    drop(stream);
    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_gesture_released_after_idle() {
    let daemon = start_daemon(socket_path("idle"), 100).await;
    let mut stream = daemon.connect().await;

    stream.write_all(b"left:5\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    stream.write_all(b"right:2\n").await.unwrap();

    wait_for_input(&daemon.input, |input| input.gesture_ends() == 1)
        .await
        .expect("gesture should be released after the idle period");
    assert_eq!(daemon.input.gesture_starts(), 1);
    assert_eq!(daemon.input.moves(), vec![-150, 60]);

    drop(stream);
    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_sequential_connections() {
    let mut daemon = start_daemon(socket_path("sequential"), 1000).await;

    for line in [&b"right:1\n"[..], b"right:2\n"] {
        let mut stream = daemon.connect().await;
        stream.write_all(line).await.unwrap();
        stream.shutdown().await.unwrap();
        drop(stream);
        wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
            s.listener == ListenerState::Listening && s.events_handled >= 1
        })
        .await
        .expect("daemon should return to listening");
    }

    let status = wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
        s.events_handled == 2
    })
    .await
    .expect("both connections should be served");
    assert_eq!(status.connections_accepted, 2);
    assert_eq!(daemon.input.moves(), vec![30, 60]);

    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_second_client_waits_for_first() {
    let mut daemon = start_daemon(socket_path("serial"), 10_000).await;

    let mut first = daemon.connect().await;
    first.write_all(b"right:1\n").await.unwrap();
    wait_for_input(&daemon.input, |input| input.moves().len() == 1)
        .await
        .expect("first client should be served");

    // Queued behind the first connection; its line is not read yet.
    let mut second = daemon.connect().await;
    second.write_all(b"right:2\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(daemon.input.moves(), vec![30]);
    assert_eq!(daemon.status.borrow().connections_accepted, 1);

    drop(first);
    let status = wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
        s.events_handled == 2
    })
    .await
    .expect("second client should be served after the first leaves");
    assert_eq!(status.connections_accepted, 2);
    assert_eq!(daemon.input.moves(), vec![30, 60]);
    assert_eq!(daemon.input.gesture_starts(), 1);

    drop(second);
    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_unterminated_line_flushed_on_close() {
    let mut daemon = start_daemon(socket_path("unterminated"), 1000).await;
    let mut stream = daemon.connect().await;
    stream.write_all(b"left:2").await.unwrap();
    stream.shutdown().await.unwrap();
    drop(stream);

    wait_for_status(&mut daemon.status, Duration::from_secs(5), |s| {
        s.events_handled == 1
    })
    .await
    .expect("final line should be dispatched");
    assert_eq!(daemon.input.moves(), vec![-60]);

    daemon.stop().await.unwrap();
}

#[tokio::test]
async fn test_stale_endpoint_is_replaced() {
    let socket = socket_path("stale");
    std::fs::write(&socket, b"left over from a crash").unwrap();

    let daemon = start_daemon(socket.clone(), 1000).await;
    let mut stream = daemon.connect().await;
    stream.write_all(b"right:3\n").await.unwrap();
    wait_for_input(&daemon.input, |input| input.moves() == vec![90])
        .await
        .expect("daemon should serve on the replaced endpoint");

    drop(stream);
    daemon.stop().await.unwrap();
    assert!(!socket.exists());
}

#[tokio::test]
async fn test_shutdown_releases_active_gesture() {
    let daemon = start_daemon(socket_path("shutdown"), 10_000).await;
    let mut stream = daemon.connect().await;
    stream.write_all(b"right:1\n").await.unwrap();
    wait_for_input(&daemon.input, |input| input.moves().len() == 1)
        .await
        .expect("event should be handled");
    assert_eq!(daemon.input.gesture_ends(), 0);

    let socket = daemon.socket.clone();
    let input = daemon.input.clone();
    daemon.stop().await.unwrap();

    assert_eq!(input.gesture_starts(), 1);
    assert_eq!(input.gesture_ends(), 1);
    assert!(input.is_closed());
    assert!(!socket.exists());
    drop(stream);
}

#[tokio::test]
async fn test_shutdown_when_idle_emits_nothing() {
    let daemon = start_daemon(socket_path("idle-shutdown"), 100).await;
    let socket = daemon.socket.clone();
    let input = daemon.input.clone();
    daemon.stop().await.unwrap();

    assert_eq!(input.injector_calls(), 0);
    assert!(input.is_closed());
    assert!(!socket.exists());
}

#[tokio::test]
async fn test_device_write_failure_is_fatal() {
    let daemon = start_daemon(socket_path("fatal"), 10_000).await;
    daemon.input.set_pointer_failure(true);

    let mut stream = daemon.connect().await;
    stream.write_all(b"left:1\n").await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), daemon.handle)
        .await
        .expect("daemon should stop on its own")
        .expect("daemon task should not panic");
    let err = result.expect_err("device failure should end the run");
    assert!(err.is_fatal());
    assert!(matches!(err, DaemonError::Input(InputError::DeviceWrite(_))));

    assert_eq!(daemon.input.gesture_starts(), 1);
    assert_eq!(daemon.input.gesture_ends(), 1);
    assert!(daemon.input.is_closed());
    assert!(!daemon.socket.exists());
    drop(stream);
}

#[tokio::test]
async fn test_bind_failure_closes_device() {
    init_tracing();
    let parent = socket_path("parent-file");
    std::fs::write(&parent, b"not a directory").unwrap();

    let (injector, pointer, input) = mock_backends();
    let mut daemon = Daemon::new(
        test_config(parent.join("events.sock"), 100),
        Box::new(injector),
        Box::new(pointer),
    );
    let err = daemon.run().await.expect_err("bind should fail");
    assert!(matches!(err, DaemonError::EndpointBind { .. }));
    assert!(input.is_closed());

    std::fs::remove_file(&parent).unwrap();
}
