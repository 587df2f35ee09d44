// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Upload failures that reach the server are not errors here: they are
//! classified into [`UploadOutcome`](crate::models::UploadOutcome). This
//! type covers everything that stops an upload before the network is
//! touched. Configuration and cache failures have their own error types
//! in [`crate::config`] and [`crate::services::session_cache`].

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("GPX file is unreadable: {0}")]
    PayloadRead(String),

    #[error("Could not resolve file name: {0}")]
    NameResolution(String),
}

impl AppError {
    /// True for failures with the local GPX file (read or name lookup).
    ///
    /// These abandon the upload before any connection is opened.
    pub fn is_local_file_error(&self) -> bool {
        matches!(self, AppError::PayloadRead(_) | AppError::NameResolution(_))
    }
}

/// Result type alias for fallible client operations
pub type Result<T> = std::result::Result<T, AppError>;
