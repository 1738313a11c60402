// SPDX-License-Identifier: Apache-2.0

use lendhub_core::PresenceSignals;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Per-user socket bookkeeping behind the presence signals. Sockets report
/// themselves active or backgrounded; the persisted `isOnline` flag is
/// supplied by the caller since it lives in the user document.
#[derive(Default)]
pub struct PresenceRegistry {
    sessions: Mutex<HashMap<String, HashMap<u64, bool>>>,
    next_socket: AtomicU64,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a socket session, initially active (a freshly connected tab
    /// is in the foreground). Returns the session handle.
    pub fn connect(&self, user_id: &str) -> u64 {
        let socket_id = self.next_socket.fetch_add(1, Ordering::Relaxed) + 1;
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(user_id.to_string())
            .or_default()
            .insert(socket_id, true);
        socket_id
    }

    /// Marks a session active (foreground tab) or backgrounded.
    pub fn set_active(&self, user_id: &str, socket_id: u64, active: bool) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sockets) = sessions.get_mut(user_id) {
            if let Some(flag) = sockets.get_mut(&socket_id) {
                *flag = active;
            }
        }
    }

    /// Removes a session; returns how many sockets the user still has.
    pub fn disconnect(&self, user_id: &str, socket_id: u64) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sockets) = sessions.get_mut(user_id) else {
            return 0;
        };
        sockets.remove(&socket_id);
        let remaining = sockets.len();
        if remaining == 0 {
            sessions.remove(user_id);
        }
        remaining
    }

    #[must_use]
    pub fn signals(&self, user_id: &str, db_is_online: bool) -> PresenceSignals {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let sockets = sessions.get(user_id);
        let socket_count = sockets.map_or(0, HashMap::len) as u32;
        PresenceSignals {
            has_active_socket: sockets.is_some_and(|s| s.values().any(|active| *active)),
            has_any_socket: socket_count > 0,
            db_is_online,
            socket_count,
        }
    }
}
