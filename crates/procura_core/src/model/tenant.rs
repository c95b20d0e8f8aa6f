//! Tenant (company) model and ownership traits.
//!
//! # Responsibility
//! - Define `Company`, the tenant itself.
//! - Define `Record` / `TenantScoped`, the seams used by store operations.
//!
//! # Invariants
//! - `TenantScoped::company_id()` is stable for the record lifetime.
//! - A blank tenant id never owns any record.

use crate::model::validation::{require_id, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant key carried by every tenant-tagged record.
///
/// Kept as a type alias so signatures read as ownership, not free text.
pub type TenantId = String;

/// Common behavior of every stored record.
pub trait Record: Clone {
    /// Stable record id. Tenant slice writes and user registration keep it
    /// unique inside its collection.
    fn record_id(&self) -> &str;

    /// Checks record-level invariants before the record enters the store.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Record owned by exactly one tenant.
pub trait TenantScoped: Record {
    /// Owning company id.
    fn company_id(&self) -> &str;

    /// Returns whether this record belongs to `tenant_id`.
    ///
    /// A blank `tenant_id` owns nothing, which models the logged-out state.
    fn belongs_to(&self, tenant_id: &str) -> bool {
        !tenant_id.is_empty() && self.company_id() == tenant_id
    }
}

/// Company registered in the system; every tenant-tagged record points here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: TenantId,
    pub name: String,
    /// Brazilian company registry number, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cnpj: None,
            created_at: Utc::now(),
        }
    }
}

impl Record for Company {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("company", &self.id)
    }
}

/// Generates a fresh record id with a readable collection prefix.
///
/// Ids only need to be unique per collection; the prefix keeps snapshots
/// readable when inspected by hand.
pub fn generate_record_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::{generate_record_id, Company, Record};

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let first = generate_record_id("u");
        let second = generate_record_id("u");
        assert!(first.starts_with("u-"));
        assert_ne!(first, second);
    }

    #[test]
    fn company_with_blank_id_is_invalid() {
        let company = Company::new("  ", "Nameless");
        assert!(company.validate().is_err());
    }
}
