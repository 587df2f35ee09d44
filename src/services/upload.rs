// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload client for the stats computation server.
//!
//! Each upload opens one connection and runs a fixed exchange:
//! 1. Send the username frame
//! 2. Send the GPX payload frame
//! 3. Flush
//! 4. Read exactly one response frame
//! 5. Release the connection (on every path, success or failure)
//!
//! The result is always classified into an [`UploadOutcome`]; this
//! component never retries.

use crate::config::Config;
use crate::models::{GpxPayload, UploadOutcome};
use crate::protocol::{read_frame, write_frame, ServerResponse, UsernameFrame, WireError};
use dashmap::DashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Opens the connection used for one upload.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(&self, addr: &str) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, addr: &str) -> impl Future<Output = io::Result<TcpStream>> + Send {
        let addr = addr.to_string();
        async move {
            let stream = TcpStream::connect(addr).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
    }
}

/// Per-user locks serializing uploads of the same username.
type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Stage of the exchange where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Connect,
    SendUsername,
    SendPayload,
    Flush,
    ReadResponse,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Connect => "connect",
            Stage::SendUsername => "write username",
            Stage::SendPayload => "write payload",
            Stage::Flush => "flush",
            Stage::ReadResponse => "read response",
        }
    }
}

/// Why an exchange did not produce a server response.
#[derive(Debug)]
enum ExchangeError {
    Timeout(Stage),
    Io(Stage, io::Error),
    Wire(Stage, WireError),
}

impl ExchangeError {
    fn into_outcome(self) -> UploadOutcome {
        match self {
            ExchangeError::Timeout(stage) => {
                UploadOutcome::TransportError(format!("{} timed out", stage.as_str()))
            }
            ExchangeError::Io(stage, e) => {
                UploadOutcome::TransportError(format!("{} failed: {}", stage.as_str(), e))
            }
            ExchangeError::Wire(Stage::ReadResponse, e) if !e.is_transport() => {
                UploadOutcome::ProtocolViolation(e.to_string())
            }
            ExchangeError::Wire(stage, e) => {
                UploadOutcome::TransportError(format!("{} failed: {}", stage.as_str(), e))
            }
        }
    }
}

/// Client for the upload exchange.
pub struct UploadClient<C: Connector = TcpConnector> {
    connector: C,
    server_addr: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_frame_bytes: usize,
    user_locks: UserLocks,
}

impl UploadClient<TcpConnector> {
    /// Create a TCP client for the server named in `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> UploadClient<C> {
    /// Create a client that opens connections through `connector`.
    pub fn with_connector(config: &Config, connector: C) -> Self {
        Self {
            connector,
            server_addr: config.server_addr(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            max_frame_bytes: config.max_frame_bytes,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    /// Address every upload connects to.
    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Run one upload on a new task and hand its outcome to `on_complete`.
    ///
    /// `on_complete` runs exactly once, after the connection is released.
    pub fn upload_async<F>(
        self: &Arc<Self>,
        username: String,
        payload: GpxPayload,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(UploadOutcome) + Send + 'static,
    {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = client.upload(&username, payload).await;
            on_complete(outcome);
        })
    }

    /// Run one upload and classify the result.
    ///
    /// Uploads for the same username wait for each other; different
    /// usernames proceed independently.
    pub async fn upload(&self, username: &str, payload: GpxPayload) -> UploadOutcome {
        let lock = self
            .user_locks
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.upload_locked(username, payload).await
        };

        // Forget the lock once no other upload for this user holds or awaits it.
        drop(lock);
        self.user_locks
            .remove_if(username, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }

    async fn upload_locked(&self, username: &str, payload: GpxPayload) -> UploadOutcome {
        tracing::info!(
            username = %username,
            file_name = %payload.file_name,
            bytes = payload.len(),
            sha256 = %payload.fingerprint(),
            server = %self.server_addr,
            "Uploading GPX"
        );

        let outcome = match self.exchange(username, &payload).await {
            Ok(response) => response.into_outcome(),
            Err(e) => e.into_outcome(),
        };

        match &outcome {
            UploadOutcome::Success(stats) => tracing::info!(
                username = %username,
                file_name = %payload.file_name,
                speed_kmh = stats.speed_kmh,
                distance_km = stats.distance_km,
                "Upload processed"
            ),
            UploadOutcome::Rejected(reason) => tracing::warn!(
                username = %username,
                file_name = %payload.file_name,
                reason = %reason,
                "Upload rejected by server"
            ),
            UploadOutcome::TransportError(cause) => tracing::error!(
                username = %username,
                file_name = %payload.file_name,
                error = %cause,
                "Upload transport failure"
            ),
            UploadOutcome::ProtocolViolation(detail) => tracing::error!(
                username = %username,
                file_name = %payload.file_name,
                error = %detail,
                "Server response violated protocol"
            ),
        }

        outcome
    }

    /// One request/response exchange over a fresh connection.
    ///
    /// Every handle opened here is owned by a local binding, so any early
    /// return drops (and closes) exactly what was opened so far.
    async fn exchange(
        &self,
        username: &str,
        payload: &GpxPayload,
    ) -> Result<ServerResponse, ExchangeError> {
        let limit = self.max_frame_bytes;

        let stream = tokio::time::timeout(
            self.connect_timeout,
            self.connector.connect(&self.server_addr),
        )
        .await
        .map_err(|_| ExchangeError::Timeout(Stage::Connect))?
        .map_err(|e| ExchangeError::Io(Stage::Connect, e))?;

        let (read_half, mut writer) = tokio::io::split(stream);

        let username_frame = UsernameFrame {
            username: username.to_string(),
        };
        write_frame(&mut writer, &username_frame, limit)
            .await
            .map_err(|e| ExchangeError::Wire(Stage::SendUsername, e))?;
        write_frame(&mut writer, payload, limit)
            .await
            .map_err(|e| ExchangeError::Wire(Stage::SendPayload, e))?;
        writer
            .flush()
            .await
            .map_err(|e| ExchangeError::Io(Stage::Flush, e))?;

        let mut reader = BufReader::new(read_half);
        let response = tokio::time::timeout(self.read_timeout, read_frame(&mut reader, limit))
            .await
            .map_err(|_| ExchangeError::Timeout(Stage::ReadResponse))?
            .map_err(|e| ExchangeError::Wire(Stage::ReadResponse, e))?;

        tracing::debug!(server = %self.server_addr, "Response received, closing connection");
        Ok(response)
    }
}
