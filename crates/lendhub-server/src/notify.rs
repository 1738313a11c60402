// SPDX-License-Identifier: Apache-2.0

use lendhub_model::LoanStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Events are retained per user until the client acknowledges them, but never
/// more than this many; past the cap the oldest unacknowledged event is lost.
pub const MAX_BACKLOG: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    LoanStatusChanged {
        loan_id: String,
        status: LoanStatus,
    },
    WithdrawalResolved {
        withdrawal_id: String,
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    BalanceChanged {
        available_balance: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub seq: u64,
    pub event: NotificationEvent,
}

#[derive(Debug, Default)]
struct UserChannel {
    next_seq: u64,
    backlog: VecDeque<Notification>,
    sender: Option<UnboundedSender<Notification>>,
}

/// Per-user notification fan-out with at-least-once delivery: every publish
/// is queued until acked, and a live socket gets it immediately as well.
/// Owned by `AppState` and passed down explicitly; there is no global hub.
#[derive(Default)]
pub struct NotificationHub {
    inner: Mutex<HashMap<String, UserChannel>>,
}

impl NotificationHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next per-user sequence number, queues the event, and
    /// pushes it to the live socket if one is attached.
    pub fn publish(&self, user_id: &str, event: NotificationEvent) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let channel = inner.entry(user_id.to_string()).or_default();
        channel.next_seq += 1;
        let notification = Notification {
            seq: channel.next_seq,
            event,
        };
        channel.backlog.push_back(notification.clone());
        if channel.backlog.len() > MAX_BACKLOG {
            channel.backlog.pop_front();
        }
        if let Some(sender) = &channel.sender {
            if sender.send(notification).is_err() {
                channel.sender = None;
            }
        }
        channel.next_seq
    }

    /// Attaches a socket session: returns the live receiver plus every
    /// not-yet-acknowledged event, oldest first. A newer session replaces the
    /// previous sender (latest socket wins the live feed; the backlog keeps
    /// both honest).
    pub fn subscribe(&self, user_id: &str) -> (UnboundedReceiver<Notification>, Vec<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let channel = inner.entry(user_id.to_string()).or_default();
        channel.sender = Some(tx);
        (rx, channel.backlog.iter().cloned().collect())
    }

    /// Acknowledges delivery of everything up to and including `seq`.
    pub fn ack(&self, user_id: &str, seq: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(channel) = inner.get_mut(user_id) {
            channel.backlog.retain(|n| n.seq > seq);
        }
    }

    pub fn detach(&self, user_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(channel) = inner.get_mut(user_id) {
            channel.sender = None;
        }
    }

    #[must_use]
    pub fn pending_count(&self, user_id: &str) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(user_id).map_or(0, |c| c.backlog.len())
    }
}
