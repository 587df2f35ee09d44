// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_tracker::config::Config;
use activity_tracker::models::{ActivityStats, GpxPayload};
use activity_tracker::protocol::{encode_frame, read_frame, ServerResponse, UsernameFrame};
use activity_tracker::services::Connector;
use activity_tracker::ui::{NotificationDispatcher, UiPresenter};
use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const LIMIT: usize = 1024 * 1024;

/// Stats used across the upload scenarios.
#[allow(dead_code)]
pub fn sample_stats() -> ActivityStats {
    ActivityStats::new(12.5, 340.0, 45.0, 9.8)
}

/// A 1024-byte `track.gpx` payload.
#[allow(dead_code)]
pub fn sample_payload() -> GpxPayload {
    GpxPayload::new("track.gpx", vec![b'g'; 1024])
}

/// Config pointing at `port` on localhost.
#[allow(dead_code)]
pub fn config_for_port(port: u16) -> Config {
    Config {
        master_port: port,
        ..Config::test_default()
    }
}

// ─── Mock computation server ─────────────────────────────────────────────

/// What the mock server does after reading a request.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    /// Send this raw frame body (a newline is appended).
    Frame(String),
    /// Drop the connection without answering.
    Close,
    /// Wait, then send the frame.
    Delayed(Duration, String),
}

#[allow(dead_code)]
impl Reply {
    pub fn invalid() -> Self {
        Reply::Frame(r#"{"kind":"INVALID"}"#.to_string())
    }

    pub fn stats(stats: ActivityStats) -> Self {
        let frame = encode_frame(&ServerResponse::Stats(stats), LIMIT).expect("encode stats");
        Reply::Frame(String::from_utf8(frame).expect("utf8").trim_end().to_string())
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub username: String,
    pub payload: GpxPayload,
}

/// Handle to a running mock server.
#[allow(dead_code)]
pub struct MockServer {
    pub port: u16,
    /// Highest number of connections handled at the same time.
    pub max_concurrent: Arc<AtomicUsize>,
    handle: JoinHandle<Vec<ReceivedRequest>>,
}

#[allow(dead_code)]
impl MockServer {
    /// Wait for every scripted connection and return what was received.
    pub async fn requests(self) -> Vec<ReceivedRequest> {
        self.handle.await.expect("mock server panicked")
    }
}

/// Serve one connection per reply, concurrently, in accept order.
#[allow(dead_code)]
pub async fn spawn_server(replies: Vec<Reply>) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let active = Arc::new(AtomicUsize::new(0));
    let max_concurrent = Arc::new(AtomicUsize::new(0));
    let max_seen = max_concurrent.clone();

    let handle = tokio::spawn(async move {
        let mut connections = Vec::new();
        for reply in replies {
            let (socket, _) = listener.accept().await.expect("accept");
            let active = active.clone();
            let max_seen = max_seen.clone();
            connections.push(tokio::spawn(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);

                let (read_half, mut write_half) = socket.into_split();
                let mut reader = BufReader::new(read_half);
                let user: UsernameFrame = read_frame(&mut reader, LIMIT).await.expect("username");
                let payload: GpxPayload = read_frame(&mut reader, LIMIT).await.expect("payload");

                let body = match reply {
                    Reply::Frame(body) => Some(body),
                    Reply::Delayed(delay, body) => {
                        tokio::time::sleep(delay).await;
                        Some(body)
                    }
                    Reply::Close => None,
                };
                active.fetch_sub(1, Ordering::SeqCst);

                if let Some(body) = body {
                    // The client may already have given up (timeouts).
                    let _ = write_half.write_all(format!("{}\n", body).as_bytes()).await;
                }

                ReceivedRequest {
                    username: user.username,
                    payload,
                }
            }));
        }

        let mut received = Vec::new();
        for connection in connections {
            received.push(connection.await.expect("connection task"));
        }
        received
    });

    MockServer {
        port,
        max_concurrent,
        handle,
    }
}

// ─── Failure-injecting connector ─────────────────────────────────────────

/// Point in the exchange where the mock transport fails.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Connect,
    WriteUsername,
    WritePayload,
    ReadResponse,
}

/// Connector whose streams count how often they are closed.
#[derive(Clone, Default)]
pub struct MockConnector {
    pub fail_at: Option<FailAt>,
    pub response: Vec<u8>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub written: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockConnector {
    pub fn new(fail_at: Option<FailAt>, response: &[u8]) -> Self {
        Self {
            fail_at,
            response: response.to_vec(),
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    type Stream = MockStream;

    fn connect(&self, _addr: &str) -> impl Future<Output = io::Result<MockStream>> + Send {
        let result = if self.fail_at == Some(FailAt::Connect) {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        } else {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(MockStream {
                fail_at: self.fail_at,
                writes: 0,
                response: self.response.clone(),
                read_pos: 0,
                written: self.written.clone(),
                closed: self.closed.clone(),
            })
        };
        async move { result }
    }
}

/// In-memory stream; increments the shared `closed` counter on drop.
pub struct MockStream {
    fail_at: Option<FailAt>,
    writes: usize,
    response: Vec<u8>,
    read_pos: usize,
    written: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicUsize>,
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.fail_at == Some(FailAt::ReadResponse) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "reset by peer",
            )));
        }
        let remaining = &this.response[this.read_pos..];
        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        this.read_pos += n;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.writes += 1;
        let fail = matches!(
            (this.fail_at, this.writes),
            (Some(FailAt::WriteUsername), 1) | (Some(FailAt::WritePayload), 2)
        );
        if fail {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")));
        }
        this.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

// ─── Recording collaborators ─────────────────────────────────────────────

/// Presenter that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub renders: Vec<(Option<ActivityStats>, Option<String>)>,
    pub messages: Vec<String>,
}

impl UiPresenter for RecordingPresenter {
    fn render(&mut self, stats: Option<&ActivityStats>, username: Option<&str>) {
        self.renders
            .push((stats.copied(), username.map(str::to_string)));
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Notifier that remembers every (title, body) pair.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notifications: RefCell<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.notifications.borrow().clone()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}
