// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity Tracker client: upload GPX tracks for remote stats computation
//!
//! This crate provides the client core: the upload exchange with the
//! computation server, the single-slot session cache, and the resume-time
//! reconciliation that keeps cached stats from being shown to the wrong
//! user.

pub mod config;
pub mod error;
pub mod models;
pub mod protocol;
pub mod services;
pub mod session;
pub mod time_utils;
pub mod ui;

pub use config::Config;
pub use session::Session;
