// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client logic layer.

pub mod payload;
pub mod reconcile;
pub mod session_cache;
pub mod upload;

pub use payload::load_payload;
pub use reconcile::{reconcile, ReconcileRule, Reconciled};
pub use session_cache::{CacheError, SessionCache};
pub use upload::{Connector, TcpConnector, UploadClient};
