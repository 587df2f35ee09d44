// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The UI owner: session state, lifecycle boundaries and upload completion.
//!
//! [`Session`] is `!Send`: it stays on the thread that created it and is
//! the only thing that touches the cache, the presenter and the notifier.
//! Upload workers never see it; they post a [`UiEvent`] into
//! its queue and the session applies the result when it drains the queue.

use crate::error::Result;
use crate::models::{ActivityStats, GpxPayload, UploadOutcome};
use crate::services::payload::load_payload;
use crate::services::reconcile::{reconcile, ReconcileRule};
use crate::services::session_cache::SessionCache;
use crate::services::upload::{Connector, TcpConnector, UploadClient};
use crate::ui::{NotificationDispatcher, UiPresenter};
use std::marker::PhantomData;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Notification title once the server has computed stats.
pub const UPLOAD_READY_TITLE: &str = "The data for your GPX is ready!";

/// Notification title when an upload could not be completed.
pub const UPLOAD_FAILED_TITLE: &str = "Upload failed";

/// Message shown when the server rejects a GPX owned by someone else.
pub const REJECTED_MESSAGE: &str =
    "Invalid GPX: You cannot send a GPX registered by a different user!";

/// Work handed back to the UI owner.
#[derive(Debug)]
pub enum UiEvent {
    UploadFinished {
        username: String,
        file_name: String,
        outcome: UploadOutcome,
    },
}

/// Session state owned by the UI thread.
pub struct Session<P, N, C: Connector = TcpConnector> {
    username: Option<String>,
    stats: Option<ActivityStats>,
    cache: SessionCache,
    client: Arc<UploadClient<C>>,
    presenter: P,
    notifier: N,
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    in_flight: usize,
    /// Pins the session to the UI owner.
    _ui_owner: PhantomData<Rc<()>>,
}

impl<P, N, C> Session<P, N, C>
where
    P: UiPresenter,
    N: NotificationDispatcher,
    C: Connector,
{
    pub fn new(
        cache: SessionCache,
        client: Arc<UploadClient<C>>,
        presenter: P,
        notifier: N,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            username: None,
            stats: None,
            cache,
            client,
            presenter,
            notifier,
            events_tx,
            events_rx,
            in_flight: 0,
            _ui_owner: PhantomData,
        }
    }

    /// Active username, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Stats currently shown, if any.
    pub fn stats(&self) -> Option<&ActivityStats> {
        self.stats.as_ref()
    }

    fn active_user(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Number of uploads whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Persist the current {username, stats} pair.
    ///
    /// Cache failures are logged; suspending never fails.
    /// Stats are only written alongside a non-empty username.
    pub fn on_suspend(&self) {
        let user = self.active_user();
        let stats = user.and(self.stats.as_ref());
        if let Err(e) = self.cache.save(user, stats) {
            tracing::warn!(error = %e, "Failed to save session cache");
        }
    }

    /// Reconcile the cached record with `current_user`, then render.
    pub fn on_resume(&mut self, current_user: Option<&str>) -> ReconcileRule {
        let (cached_username, cached_stats) = self.cache.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load session cache, starting empty");
            (None, None)
        });

        let result = reconcile(cached_username.as_deref(), cached_stats, current_user);
        tracing::info!(
            rule = ?result.rule,
            username = ?result.username,
            has_stats = result.stats.is_some(),
            "Session resumed"
        );

        self.username = result.username;
        self.stats = result.stats;
        self.presenter
            .render(self.stats.as_ref(), self.username.as_deref());
        result.rule
    }

    /// Read the GPX file at `path` and start uploading it.
    ///
    /// Local file failures abandon the upload before any connection is
    /// opened; the user gets a failure notification.
    pub fn upload_file<Q: AsRef<Path>>(&mut self, path: Q) -> Result<()> {
        let path = path.as_ref();
        match load_payload(path) {
            Ok(payload) => {
                self.start_upload(payload);
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Cannot upload GPX");
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.notifier
                    .notify(UPLOAD_FAILED_TITLE, &format!("Could not read {}", label));
                Err(e)
            }
        }
    }

    /// Start one upload worker for `payload` as the active user.
    pub fn start_upload(&mut self, payload: GpxPayload) {
        let username = self.username.clone().unwrap_or_default();
        let file_name = payload.file_name.clone();
        let events = self.events_tx.clone();

        tracing::debug!(username = %username, file_name = %file_name, "Starting upload worker");
        self.in_flight += 1;

        let worker_username = username.clone();
        // Detached: the worker reports back through the event queue.
        let _worker = self
            .client
            .upload_async(worker_username, payload, move |outcome| {
                // The receiver lives as long as the session.
                let _ = events.send(UiEvent::UploadFinished {
                    username,
                    file_name,
                    outcome,
                });
            });
    }

    /// Apply every completion that is already queued. Returns how many ran.
    pub fn drain_ready(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns `false` immediately when no upload is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Wait until every started upload has been applied.
    pub async fn wait_for_uploads(&mut self) {
        while self.process_next().await {}
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::UploadFinished {
                username,
                file_name,
                outcome,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                tracing::debug!(
                    username = %username,
                    file_name = %file_name,
                    outcome = outcome.kind(),
                    "Applying upload result"
                );
                self.apply_outcome(&username, &file_name, outcome);
            }
        }
    }

    fn apply_outcome(&mut self, username: &str, file_name: &str, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Success(stats) => {
                self.notifier
                    .notify(UPLOAD_READY_TITLE, &format!("Done processing {}", file_name));

                // Stats belong to the user who uploaded them.
                if self.active_user() != Some(username) {
                    tracing::warn!(
                        uploaded_by = %username,
                        active = ?self.username,
                        "Discarding stats for a user who is no longer active"
                    );
                    return;
                }
                self.stats = Some(stats);
                self.presenter
                    .render(self.stats.as_ref(), self.username.as_deref());
            }
            UploadOutcome::Rejected(_) => {
                self.presenter.show_message(REJECTED_MESSAGE);
            }
            UploadOutcome::TransportError(_) | UploadOutcome::ProtocolViolation(_) => {
                self.notifier.notify(
                    UPLOAD_FAILED_TITLE,
                    &format!("Could not process {}", file_name),
                );
            }
        }
    }
}
