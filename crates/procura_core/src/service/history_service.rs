//! History (audit-trail) recorder.
//!
//! # Responsibility
//! - Build history entries for tracked actions and prepend them to the log.
//! - Provide read helpers that keep the stored most-recent-first order.
//!
//! # Invariants
//! - New entries are inserted at index 0; existing entries are never touched.
//! - Ids are unique within a process: epoch millis plus a monotonic sequence.
//! - Timestamps never decrease across calls on the same recorder, even if
//!   the wall clock steps backwards.
//! - Without an actor nothing is recorded.

use crate::model::history::{ActionKind, HistoryLog};
use crate::model::user::User;
use chrono::{DateTime, Utc};
use log::debug;

/// Stateful history entry factory.
#[derive(Debug, Default)]
pub struct HistoryRecorder {
    sequence: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one action by `actor` and returns the stored entry.
    ///
    /// Returns `None` and leaves `logs` untouched when `actor` is `None`.
    pub fn record(
        &mut self,
        logs: &mut Vec<HistoryLog>,
        actor: Option<&User>,
        action: ActionKind,
        target: impl Into<String>,
        details: impl Into<String>,
        item_id: Option<&str>,
    ) -> Option<HistoryLog> {
        let Some(actor) = actor else {
            debug!(
                "event=history_record module=history status=skipped reason=no_actor action={}",
                action.as_str()
            );
            return None;
        };

        let timestamp = self.next_timestamp();
        let entry = HistoryLog {
            id: self.next_id(timestamp),
            company_id: actor.company_id.clone(),
            timestamp,
            user_id: actor.id.clone(),
            user_name: actor.name.clone(),
            user_avatar: actor.avatar.clone(),
            action,
            target: target.into(),
            details: details.into(),
            item_id: item_id.map(str::to_string),
        };
        logs.insert(0, entry.clone());
        debug!(
            "event=history_record module=history status=ok action={} tenant={} log_len={}",
            action.as_str(),
            entry.company_id,
            logs.len()
        );
        Some(entry)
    }

    /// Records a login by `user`, who is the actor of their own login.
    pub fn record_login(&mut self, logs: &mut Vec<HistoryLog>, user: &User) -> Option<HistoryLog> {
        self.record(
            logs,
            Some(user),
            ActionKind::Login,
            "System",
            "User signed in to the platform",
            None,
        )
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn next_id(&mut self, timestamp: DateTime<Utc>) -> String {
        self.sequence += 1;
        format!("h{}-{}", timestamp.timestamp_millis(), self.sequence)
    }
}

/// Entries linked to `item_id`, most recent first.
pub fn history_for_item<'a>(logs: &'a [HistoryLog], item_id: &str) -> Vec<&'a HistoryLog> {
    logs.iter()
        .filter(|entry| entry.item_id.as_deref() == Some(item_id))
        .collect()
}

/// The `limit` most recent entries, without re-sorting.
pub fn recent(logs: &[HistoryLog], limit: usize) -> &[HistoryLog] {
    &logs[..logs.len().min(limit)]
}
