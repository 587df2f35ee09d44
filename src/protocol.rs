// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire protocol for the upload exchange.
//!
//! One exchange per connection, three frames in total:
//! 1. client → server: [`UsernameFrame`]
//! 2. client → server: [`GpxPayload`]
//! 3. server → client: [`ServerResponse`]
//!
//! Every frame is a single JSON document terminated by `\n`. The server
//! response carries an explicit `kind` discriminant so the client never
//! has to guess the variant from the shape of the value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::{ActivityStats, UploadOutcome, CROSS_USER_GPX};

/// First frame of every exchange: the active username (may be empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameFrame {
    pub username: String,
}

/// The single frame the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ServerResponse {
    /// The GPX is registered to a different user.
    #[serde(rename = "INVALID")]
    Invalid,
    /// Stats computed for the uploaded track.
    #[serde(rename = "STATS")]
    Stats(ActivityStats),
}

impl ServerResponse {
    /// Map a decoded response onto the outcome of the attempt.
    pub fn into_outcome(self) -> UploadOutcome {
        match self {
            ServerResponse::Invalid => UploadOutcome::Rejected(CROSS_USER_GPX.to_string()),
            ServerResponse::Stats(stats) if stats.is_finite() => UploadOutcome::Success(stats),
            ServerResponse::Stats(_) => {
                UploadOutcome::ProtocolViolation("stats contain non-finite values".to_string())
            }
        }
    }
}

/// Errors from encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Underlying stream failed (including EOF before a full frame).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame exceeds the configured limit.
    #[error("Frame of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Frame is not valid JSON for the expected type.
    #[error("Malformed frame: {0}")]
    Malformed(String),
}

impl WireError {
    /// Whether the failure came from the transport rather than the peer's content.
    pub fn is_transport(&self) -> bool {
        matches!(self, WireError::Io(_))
    }
}

/// Serialize a value into one newline-terminated frame.
pub fn encode_frame<T: Serialize>(value: &T, limit: usize) -> Result<Vec<u8>, WireError> {
    let mut frame =
        serde_json::to_vec(value).map_err(|e| WireError::Malformed(e.to_string()))?;
    frame.push(b'\n');
    if frame.len() > limit {
        return Err(WireError::TooLarge {
            size: frame.len(),
            limit,
        });
    }
    Ok(frame)
}

/// Decode one frame (with or without its trailing newline).
pub fn decode_frame<T: DeserializeOwned>(line: &[u8], limit: usize) -> Result<T, WireError> {
    if line.len() > limit {
        return Err(WireError::TooLarge {
            size: line.len(),
            limit,
        });
    }
    let body = line.strip_suffix(b"\n").unwrap_or(line);
    serde_json::from_slice(body).map_err(|e| WireError::Malformed(e.to_string()))
}

/// Encode and write one frame. Does not flush.
pub async fn write_frame<W, T>(writer: &mut W, value: &T, limit: usize) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(value, limit)?;
    writer.write_all(&frame).await?;
    Ok(())
}

/// Read and decode exactly one frame.
///
/// EOF before a terminating newline is reported as an I/O error
/// (`UnexpectedEof`); reading stops once `limit` bytes have been consumed.
pub async fn read_frame<R, T>(reader: &mut R, limit: usize) -> Result<T, WireError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = Vec::new();
    // One extra byte lets an oversize frame be told apart from an exact fit.
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let read = (&mut *reader).take(cap).read_until(b'\n', &mut line).await?;

    if line.last() != Some(&b'\n') {
        if read as u64 >= cap {
            return Err(WireError::TooLarge { size: read, limit });
        }
        return Err(WireError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before a complete frame",
        )));
    }

    decode_frame(&line, limit)
}
