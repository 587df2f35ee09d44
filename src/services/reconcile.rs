// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resume-time reconciliation of cached stats against the active user.
//!
//! Cached stats are only ever shown to the user they were saved under.
//! Ambiguous input degrades to "no stats"; this never fails.

use crate::models::ActivityStats;

/// Which rule decided a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileRule {
    /// A different user is active; cached stats are dropped.
    UserChanged,
    /// The cached user resumed; cached stats are kept.
    SameUser,
    /// No identity was handed over; the cached identity is adopted.
    AdoptCached,
    /// Nothing usable is cached.
    NoCachedUser,
}

/// Effective session state after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub username: Option<String>,
    pub stats: Option<ActivityStats>,
    pub rule: ReconcileRule,
}

/// Decide which username is active and which stats (if any) may be shown.
///
/// Rules, first match wins:
/// 1. cached and current both non-empty and different: current user, no stats
/// 2. cached equals current, both non-empty: current user, cached stats
/// 3. cached non-empty, current absent or empty: cached user, cached stats
/// 4. otherwise: current user, no stats
pub fn reconcile(
    cached_username: Option<&str>,
    cached_stats: Option<ActivityStats>,
    current_username: Option<&str>,
) -> Reconciled {
    let cached = cached_username.filter(|u| !u.is_empty());
    let current = current_username.filter(|u| !u.is_empty());

    match (cached, current) {
        (Some(cached), Some(current)) if cached != current => Reconciled {
            username: Some(current.to_string()),
            stats: None,
            rule: ReconcileRule::UserChanged,
        },
        (Some(_), Some(current)) => Reconciled {
            username: Some(current.to_string()),
            stats: cached_stats,
            rule: ReconcileRule::SameUser,
        },
        (Some(cached), None) => Reconciled {
            username: Some(cached.to_string()),
            stats: cached_stats,
            rule: ReconcileRule::AdoptCached,
        },
        (None, _) => Reconciled {
            username: current_username.map(str::to_string),
            stats: None,
            rule: ReconcileRule::NoCachedUser,
        },
    }
}
