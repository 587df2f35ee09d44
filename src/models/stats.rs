// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity statistics computed by the remote service.
//!
//! The client never derives these values itself; it only receives,
//! caches and displays them.

use serde::{Deserialize, Serialize};

/// Summary of one tracked activity, as returned by the computation server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    /// Average speed (km/h)
    pub speed_kmh: f64,
    /// Total elevation gain (meters)
    pub elevation_meters: f64,
    /// Activity duration (minutes)
    pub time_minutes: f64,
    /// Total distance (km)
    pub distance_km: f64,
}

impl ActivityStats {
    pub fn new(speed_kmh: f64, elevation_meters: f64, time_minutes: f64, distance_km: f64) -> Self {
        Self {
            speed_kmh,
            elevation_meters,
            time_minutes,
            distance_km,
        }
    }

    /// Speed as shown on the stats card.
    pub fn speed_label(&self) -> String {
        format!("{:.2} km/h", self.speed_kmh)
    }

    /// Elevation as shown on the stats card.
    pub fn elevation_label(&self) -> String {
        format!("{:.2} meters", self.elevation_meters)
    }

    /// Duration as shown on the stats card.
    pub fn time_label(&self) -> String {
        format!("{:.2} minutes", self.time_minutes)
    }

    /// Distance as shown on the stats card.
    pub fn distance_label(&self) -> String {
        format!("{:.2} km", self.distance_km)
    }

    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.speed_kmh,
            self.elevation_meters,
            self.time_minutes,
            self.distance_km,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Greeting line shown above the stats card.
pub fn welcome_message(username: &str) -> String {
    format!("Welcome, {}", username)
}
