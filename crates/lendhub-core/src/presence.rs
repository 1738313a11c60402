// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long socket-derived signals stay trustworthy without a refresh.
/// Three poll cycles of the 5-second client fallback loop.
pub const DEFAULT_STALENESS_SECS: i64 = 15;

/// The independent presence sources: a socket the client marked active, any
/// connected socket at all, and the persisted online flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PresenceSignals {
    pub has_active_socket: bool,
    pub has_any_socket: bool,
    pub db_is_online: bool,
    pub socket_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceLevel {
    Active,
    #[serde(rename = "Multi-Tab")]
    MultiTab,
    Online,
    Offline,
}

impl PresenceLevel {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::MultiTab => "Multi-Tab",
            Self::Online => "Online",
            Self::Offline => "Offline",
        }
    }
}

impl PresenceSignals {
    /// Strict precedence list, not a transition machine: the first signal
    /// that holds decides the level, so no tie-break is ever needed.
    #[must_use]
    pub fn level(self) -> PresenceLevel {
        if self.has_active_socket {
            PresenceLevel::Active
        } else if self.has_any_socket {
            PresenceLevel::MultiTab
        } else if self.db_is_online {
            PresenceLevel::Online
        } else {
            PresenceLevel::Offline
        }
    }
}

/// Single reconciling holder for the push + poll update paths.
///
/// The legacy client merged socket events and a 5-second poll loop into
/// component state with no staleness handling, so a socket that died without
/// an event left the user "online" forever. Here both paths feed the same
/// state with a last-updated timestamp; once the socket-derived signals age
/// past the threshold they are dropped and only the persisted flag remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceReconciler {
    signals: PresenceSignals,
    updated_at: Option<DateTime<Utc>>,
    staleness: Duration,
}

impl Default for PresenceReconciler {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STALENESS_SECS))
    }
}

impl PresenceReconciler {
    #[must_use]
    pub fn new(staleness: Duration) -> Self {
        Self {
            signals: PresenceSignals::default(),
            updated_at: None,
            staleness,
        }
    }

    /// Push-path update from a socket event. Last write wins.
    pub fn observe_push(&mut self, signals: PresenceSignals, now: DateTime<Utc>) {
        self.signals = signals;
        self.updated_at = Some(now);
    }

    /// Poll-path correction. Same merge rule as the push path; the two paths
    /// are deliberately indistinguishable once recorded.
    pub fn observe_poll(&mut self, signals: PresenceSignals, now: DateTime<Utc>) {
        self.observe_push(signals, now);
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Current level. Stale socket evidence is demoted to the persisted-flag
    /// floor; a never-updated reconciler reports Offline.
    #[must_use]
    pub fn level_at(&self, now: DateTime<Utc>) -> PresenceLevel {
        match self.updated_at {
            None => PresenceLevel::Offline,
            Some(at) if now - at > self.staleness => PresenceSignals {
                has_active_socket: false,
                has_any_socket: false,
                socket_count: 0,
                db_is_online: self.signals.db_is_online,
            }
            .level(),
            Some(_) => self.signals.level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0)
            .single()
            .expect("timestamp")
    }

    #[test]
    fn precedence_table() {
        let cases = [
            ((true, true, true, 2), PresenceLevel::Active),
            ((true, false, false, 1), PresenceLevel::Active),
            ((false, true, true, 2), PresenceLevel::MultiTab),
            ((false, true, false, 1), PresenceLevel::MultiTab),
            ((false, false, true, 0), PresenceLevel::Online),
            ((false, false, false, 0), PresenceLevel::Offline),
        ];
        for ((active, any, db, count), expected) in cases {
            let level = PresenceSignals {
                has_active_socket: active,
                has_any_socket: any,
                db_is_online: db,
                socket_count: count,
            }
            .level();
            assert_eq!(level, expected);
        }
    }

    #[test]
    fn multi_tab_never_reports_online() {
        let level = PresenceSignals {
            has_active_socket: false,
            has_any_socket: true,
            db_is_online: true,
            socket_count: 3,
        }
        .level();
        assert_eq!(level, PresenceLevel::MultiTab);
    }

    #[test]
    fn fresh_push_is_trusted() {
        let mut r = PresenceReconciler::default();
        r.observe_push(
            PresenceSignals {
                has_active_socket: true,
                has_any_socket: true,
                db_is_online: true,
                socket_count: 1,
            },
            at(0),
        );
        assert_eq!(r.level_at(at(5)), PresenceLevel::Active);
    }

    #[test]
    fn stale_socket_evidence_demotes_to_db_floor() {
        let mut r = PresenceReconciler::default();
        r.observe_push(
            PresenceSignals {
                has_active_socket: true,
                has_any_socket: true,
                db_is_online: true,
                socket_count: 1,
            },
            at(0),
        );
        assert_eq!(r.level_at(at(DEFAULT_STALENESS_SECS + 1)), PresenceLevel::Online);
    }

    #[test]
    fn stale_evidence_without_db_flag_is_offline() {
        let mut r = PresenceReconciler::default();
        r.observe_push(
            PresenceSignals {
                has_active_socket: false,
                has_any_socket: true,
                db_is_online: false,
                socket_count: 2,
            },
            at(0),
        );
        assert_eq!(r.level_at(at(60)), PresenceLevel::Offline);
    }

    #[test]
    fn poll_refreshes_the_same_state() {
        let mut r = PresenceReconciler::default();
        r.observe_push(
            PresenceSignals {
                has_active_socket: true,
                has_any_socket: true,
                db_is_online: true,
                socket_count: 1,
            },
            at(0),
        );
        // Poll arrives inside the window and overwrites: last write wins.
        r.observe_poll(
            PresenceSignals {
                has_active_socket: false,
                has_any_socket: false,
                db_is_online: true,
                socket_count: 0,
            },
            at(10),
        );
        assert_eq!(r.level_at(at(12)), PresenceLevel::Online);
    }

    #[test]
    fn never_updated_reconciler_is_offline() {
        let r = PresenceReconciler::default();
        assert_eq!(r.level_at(at(0)), PresenceLevel::Offline);
    }
}
