//! Partner (supplier), segment and contract models.
//!
//! # Invariants
//! - `Partner.contact_email` is shaped like `local@domain.tld`.
//! - `PartnerContract.end_date` is not earlier than `start_date`.
//! - `segment_id` / `partner_id` are lookups only; dangling ids are allowed.

use crate::model::audit::{Attachment, ModificationStamp};
use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_amount, require_tenant, ValidationError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSegment {
    pub id: String,
    pub company_id: TenantId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub company_id: TenantId,
    pub name: String,
    pub segment_id: String,
    pub contact_person: String,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub stamp: ModificationStamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerContract {
    pub id: String,
    pub company_id: TenantId,
    pub partner_id: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub value: f64,
    /// Free-text list of purchased items/services.
    #[serde(default)]
    pub items_purchased: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub stamp: ModificationStamp,
}

impl PartnerSegment {
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            name: name.into(),
        }
    }
}

impl PartnerContract {
    /// Returns whether `day` falls inside the contract window (inclusive).
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

impl Record for PartnerSegment {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("partner segment", &self.id, &self.company_id)
    }
}

impl TenantScoped for PartnerSegment {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Record for Partner {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("partner", &self.id, &self.company_id)?;
        if !EMAIL_RE.is_match(self.contact_email.trim()) {
            return Err(ValidationError::InvalidEmail {
                id: self.id.clone(),
                email: self.contact_email.clone(),
            });
        }
        Ok(())
    }
}

impl TenantScoped for Partner {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Record for PartnerContract {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("partner contract", &self.id, &self.company_id)?;
        require_amount("partner contract", &self.id, "value", self.value)?;
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidContractWindow {
                id: self.id.clone(),
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

impl TenantScoped for PartnerContract {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

/// Contracts signed with `partner_id`, in collection order.
pub fn contracts_for_partner<'a>(
    partner_id: &str,
    contracts: &'a [PartnerContract],
) -> Vec<&'a PartnerContract> {
    contracts
        .iter()
        .filter(|contract| contract.partner_id == partner_id)
        .collect()
}
