//! Purchase request model.

use crate::model::audit::{ApprovalStatus, ModificationStamp};
use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_amount, require_tenant, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub id: String,
    pub company_id: TenantId,
    pub item: String,
    pub amount: f64,
    pub department: String,
    pub cost_center: String,
    pub requester_id: String,
    /// Denormalized so the request stays readable after the user is removed.
    pub requester_name: String,
    pub date: NaiveDate,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub justification: String,
    #[serde(flatten)]
    pub stamp: ModificationStamp,
}

impl PurchaseRequest {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Moves the request to a final decision and stamps the reviewer.
    pub fn decide(&mut self, approved: bool, reviewer_name: &str) {
        self.status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };
        self.stamp.touch(reviewer_name);
    }
}

impl Record for PurchaseRequest {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("purchase request", &self.id, &self.company_id)?;
        require_amount("purchase request", &self.id, "amount", self.amount)
    }
}

impl TenantScoped for PurchaseRequest {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}
