// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Result of a single upload attempt.

use crate::models::ActivityStats;

/// Reason attached to a server-side rejection.
pub const CROSS_USER_GPX: &str = "cross-user GPX";

/// Classified result of exactly one upload attempt.
///
/// Each value describes one attempt only; outcomes are never merged.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server computed stats for the track.
    Success(ActivityStats),
    /// The server refused the track (e.g. it belongs to another user).
    Rejected(String),
    /// Connect, write, flush or read failed, or timed out.
    TransportError(String),
    /// The server answered with something outside the protocol.
    ProtocolViolation(String),
}

impl UploadOutcome {
    /// Stats carried by a successful outcome.
    pub fn stats(&self) -> Option<&ActivityStats> {
        match self {
            UploadOutcome::Success(stats) => Some(stats),
            _ => None,
        }
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadOutcome::Success(_) => "success",
            UploadOutcome::Rejected(_) => "rejected",
            UploadOutcome::TransportError(_) => "transport_error",
            UploadOutcome::ProtocolViolation(_) => "protocol_violation",
        }
    }
}
