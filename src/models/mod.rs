// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod outcome;
pub mod payload;
pub mod stats;

pub use outcome::{UploadOutcome, CROSS_USER_GPX};
pub use payload::GpxPayload;
pub use stats::{welcome_message, ActivityStats};
