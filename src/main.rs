// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity Tracker command-line host
//!
//! Resumes the session for a user, uploads one GPX file to the computation
//! server, shows the resulting stats and persists the session on exit.
//!
//! Usage: `activity-tracker <username> <file.gpx>`

use activity_tracker::{
    config::Config,
    services::{SessionCache, UploadClient},
    ui::{ConsolePresenter, LogNotifier},
    Session,
};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    let mut args = std::env::args().skip(1);
    let (username, gpx_path) = match (args.next(), args.next()) {
        (Some(username), Some(path)) => (username, path),
        _ => anyhow::bail!("usage: activity-tracker <username> <file.gpx>"),
    };

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(server = %config.server_addr(), "Starting Activity Tracker client");

    let cache = SessionCache::open(&config.cache_dir, &config.cache_namespace);
    let client = Arc::new(UploadClient::new(&config));
    let presenter = ConsolePresenter::new(std::io::stdout());
    let notifier = LogNotifier::new(true);

    let mut session = Session::new(cache, client, presenter, notifier);
    session.on_resume(Some(&username));

    if let Err(e) = session.upload_file(&gpx_path) {
        session.on_suspend();
        return Err(e).with_context(|| format!("Failed to upload {}", gpx_path));
    }
    session.wait_for_uploads().await;

    session.on_suspend();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("activity_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
