//! Shared validation error for domain records.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violation detected by `Record::validate()`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Record id is blank.
    EmptyId { entity: &'static str },
    /// Tenant-tagged record carries a blank `company_id`.
    EmptyTenant { entity: &'static str, id: String },
    /// Matrix item does not carry exactly twelve monthly entries.
    MonthlyDataLength { id: String, len: usize },
    /// Monthly entry at `position` is not month index `position`.
    MonthOutOfOrder { id: String, position: usize, month: u8 },
    /// Month index outside `0..=11`.
    MonthOutOfRange(u8),
    /// Compliance rating outside `1..=5`.
    InvalidComplianceRating { id: String, rating: u8 },
    /// Contract ends before it starts.
    InvalidContractWindow {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Partner contact e-mail is not shaped like an address.
    InvalidEmail { id: String, email: String },
    /// A monetary field is negative or not finite.
    InvalidAmount {
        entity: &'static str,
        id: String,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { entity } => write!(f, "{entity} id must not be blank"),
            Self::EmptyTenant { entity, id } => {
                write!(f, "{entity} `{id}` has a blank company id")
            }
            Self::MonthlyDataLength { id, len } => write!(
                f,
                "matrix item `{id}` must carry 12 monthly entries, found {len}"
            ),
            Self::MonthOutOfOrder {
                id,
                position,
                month,
            } => write!(
                f,
                "matrix item `{id}` has month {month} at position {position}"
            ),
            Self::MonthOutOfRange(month) => {
                write!(f, "month index {month} is outside 0..=11")
            }
            Self::InvalidComplianceRating { id, rating } => write!(
                f,
                "audit `{id}` has compliance rating {rating}, expected 1..=5"
            ),
            Self::InvalidContractWindow { id, start, end } => write!(
                f,
                "contract `{id}` ends ({end}) before it starts ({start})"
            ),
            Self::InvalidEmail { id, email } => {
                write!(f, "partner `{id}` has invalid contact email `{email}`")
            }
            Self::InvalidAmount { entity, id, field } => {
                write!(f, "{entity} `{id}` has an invalid amount in `{field}`")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_id(entity: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyId { entity });
    }
    Ok(())
}

pub(crate) fn require_tenant(
    entity: &'static str,
    id: &str,
    company_id: &str,
) -> Result<(), ValidationError> {
    require_id(entity, id)?;
    if company_id.trim().is_empty() {
        return Err(ValidationError::EmptyTenant {
            entity,
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_amount(
    entity: &'static str,
    id: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidAmount {
            entity,
            id: id.to_string(),
            field,
        });
    }
    Ok(())
}
