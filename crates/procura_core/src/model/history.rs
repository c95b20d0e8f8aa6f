//! Audit-trail (history log) model.
//!
//! # Invariants
//! - Entries are append-only; normal flows never mutate or remove one.
//! - The collection is ordered most-recent-first.

use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_tenant, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of tracked action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Login,
    Approve,
    Reject,
    Block,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Login => "LOGIN",
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Block => "BLOCK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLog {
    pub id: String,
    /// Copied from the acting user at record time.
    pub company_id: TenantId,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub action: ActionKind,
    /// Human label of the touched object, e.g. `Audit: Licenses`.
    pub target: String,
    pub details: String,
    /// Links the entry to one record for per-item history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

impl Record for HistoryLog {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("history log", &self.id, &self.company_id)
    }
}

impl TenantScoped for HistoryLog {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}
