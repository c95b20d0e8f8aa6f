//! Budget audit model shared by planning, negotiation and transparency views.
//!
//! # Responsibility
//! - Carry planned/executed budget plus negotiation and compliance state.
//! - Derive saving and compliance score from stored fields.
//!
//! # Invariants
//! - `compliance_rating`, when present, is within `1..=5`.
//! - Monetary fields are finite and non-negative.
//! - `cost_center` holds a cost-center *code*, not its record id.

use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_amount, require_tenant, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Execution state of a budget line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Planned,
    InProgress,
    Completed,
    PartiallyExecuted,
    NotExecuted,
    Cancelled,
}

/// Approval state shared by negotiations, purchase requests and matrix items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One compliance rule check on an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub rule_id: String,
    pub checked: bool,
}

/// File attached to an audit or contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    /// Opaque payload reference (data URL or storage key).
    pub url: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

/// Last-writer stamp carried by editable records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationStamp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl ModificationStamp {
    /// Stamps `user_name` as the last writer at the current instant.
    pub fn touch(&mut self, user_name: &str) {
        self.last_modified_by = Some(user_name.to_string());
        self.last_modified_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub company_id: TenantId,
    pub title: String,
    pub department: String,
    pub cost_center: String,
    /// Reference date of the budget line.
    pub date: NaiveDate,
    pub status: AuditStatus,
    pub planned_budget: f64,
    pub executed_budget: f64,
    /// Annual/recurring budget line.
    #[serde(default)]
    pub is_recurring: bool,
    pub initial_quote: f64,
    pub final_price: f64,
    pub negotiation_status: ApprovalStatus,
    #[serde(default)]
    pub negotiation_notes: String,
    pub saving_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_rating: Option<u8>,
    #[serde(default)]
    pub compliance_checklist: Vec<ChecklistEntry>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub stamp: ModificationStamp,
}

impl Audit {
    /// Creates a planned budget line with no negotiation data yet.
    pub fn planned(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        title: impl Into<String>,
        date: NaiveDate,
        planned_budget: f64,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            title: title.into(),
            department: String::new(),
            cost_center: String::new(),
            date,
            status: AuditStatus::Planned,
            planned_budget,
            executed_budget: 0.0,
            is_recurring: false,
            initial_quote: planned_budget,
            final_price: 0.0,
            negotiation_status: ApprovalStatus::Pending,
            negotiation_notes: String::new(),
            saving_amount: 0.0,
            compliance_rating: None,
            compliance_checklist: Vec::new(),
            attachments: Vec::new(),
            stamp: ModificationStamp::default(),
        }
    }

    /// Saving obtained by negotiation.
    ///
    /// Zero until a final price is known.
    pub fn compute_saving(&self) -> f64 {
        if self.final_price > 0.0 {
            self.initial_quote - self.final_price
        } else {
            0.0
        }
    }

    /// Share of checklist entries marked as checked, in `0.0..=1.0`.
    pub fn compliance_score(&self) -> f64 {
        if self.compliance_checklist.is_empty() {
            return 0.0;
        }
        let checked = self
            .compliance_checklist
            .iter()
            .filter(|entry| entry.checked)
            .count();
        checked as f64 / self.compliance_checklist.len() as f64
    }
}

impl Record for Audit {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("audit", &self.id, &self.company_id)?;
        require_amount("audit", &self.id, "plannedBudget", self.planned_budget)?;
        require_amount("audit", &self.id, "executedBudget", self.executed_budget)?;
        require_amount("audit", &self.id, "initialQuote", self.initial_quote)?;
        require_amount("audit", &self.id, "finalPrice", self.final_price)?;
        if let Some(rating) = self.compliance_rating {
            if !(1..=5).contains(&rating) {
                return Err(ValidationError::InvalidComplianceRating {
                    id: self.id.clone(),
                    rating,
                });
            }
        }
        Ok(())
    }
}

impl TenantScoped for Audit {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::{Audit, ChecklistEntry};
    use crate::model::tenant::Record;
    use chrono::NaiveDate;

    fn sample() -> Audit {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        Audit::planned("a1", "c1", "Licenses", date, 50_000.0)
    }

    #[test]
    fn saving_is_zero_until_final_price_is_set() {
        let mut audit = sample();
        audit.initial_quote = 52_000.0;
        assert_eq!(audit.compute_saving(), 0.0);

        audit.final_price = 42_000.0;
        assert_eq!(audit.compute_saving(), 10_000.0);
    }

    #[test]
    fn compliance_score_counts_checked_entries() {
        let mut audit = sample();
        assert_eq!(audit.compliance_score(), 0.0);
        audit.compliance_checklist = vec![
            ChecklistEntry {
                rule_id: "rule1".to_string(),
                checked: true,
            },
            ChecklistEntry {
                rule_id: "rule2".to_string(),
                checked: false,
            },
        ];
        assert_eq!(audit.compliance_score(), 0.5);
    }

    #[test]
    fn validate_rejects_rating_out_of_range() {
        let mut audit = sample();
        audit.compliance_rating = Some(6);
        assert!(audit.validate().is_err());
        audit.compliance_rating = Some(5);
        assert!(audit.validate().is_ok());
    }

    #[test]
    fn serialization_flattens_modification_stamp() {
        let mut audit = sample();
        audit.stamp.touch("Ana Planejamento");
        let json = serde_json::to_value(&audit).expect("audit serializes");
        assert_eq!(json["companyId"], "c1");
        assert_eq!(json["status"], "PLANNED");
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["lastModifiedBy"], "Ana Planejamento");
    }
}
