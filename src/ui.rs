// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interfaces to the host platform's UI and notification layers.
//!
//! Both collaborators are driven only by [`Session`](crate::session::Session),
//! which lives on the UI owner.

use crate::models::{welcome_message, ActivityStats};
use std::io::Write;

/// Renders the stats card and greeting.
pub trait UiPresenter {
    /// Show `stats` (if any) and greet `username` (if any).
    fn render(&mut self, stats: Option<&ActivityStats>, username: Option<&str>);

    /// Show a short-lived message to the user.
    fn show_message(&mut self, message: &str);
}

/// Posts a "work finished" notification. Fire-and-forget.
pub trait NotificationDispatcher {
    fn notify(&self, title: &str, body: &str);
}

/// Presenter that writes the stats card as text.
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> UiPresenter for ConsolePresenter<W> {
    fn render(&mut self, stats: Option<&ActivityStats>, username: Option<&str>) {
        // Display failures are not actionable for the caller.
        if let Some(username) = username {
            let _ = writeln!(self.out, "{}", welcome_message(username));
        }
        if let Some(stats) = stats {
            let _ = writeln!(self.out, "  Average speed: {}", stats.speed_label());
            let _ = writeln!(self.out, "  Elevation:     {}", stats.elevation_label());
            let _ = writeln!(self.out, "  Time:          {}", stats.time_label());
            let _ = writeln!(self.out, "  Distance:      {}", stats.distance_label());
        }
        let _ = self.out.flush();
    }

    fn show_message(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
        let _ = self.out.flush();
    }
}

/// Notifier that emits notifications as log events.
///
/// Without permission it drops every notification silently.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    permitted: bool,
}

impl LogNotifier {
    pub fn new(permitted: bool) -> Self {
        Self { permitted }
    }
}

impl NotificationDispatcher for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        if !self.permitted {
            return;
        }
        tracing::info!(title = %title, body = %body, "Notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_presenter_renders_card() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        let stats = ActivityStats::new(12.5, 340.0, 45.0, 9.8);

        presenter.render(Some(&stats), Some("carol"));

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.starts_with("Welcome, carol\n"));
        assert!(text.contains("12.50 km/h"));
        assert!(text.contains("340.00 meters"));
        assert!(text.contains("45.00 minutes"));
        assert!(text.contains("9.80 km"));
    }

    #[test]
    fn test_console_presenter_without_stats() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.render(None, None);
        assert!(presenter.into_inner().is_empty());
    }
}
