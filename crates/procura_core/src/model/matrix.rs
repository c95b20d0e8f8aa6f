//! Recurring-cost matrix model.
//!
//! # Responsibility
//! - Model one budget line spread over the twelve months of a year.
//! - Provide month-level planned/executed bookkeeping and totals.
//!
//! # Invariants
//! - `monthly_data` has exactly 12 entries.
//! - Entry at position `i` carries month index `i` (`0` = January).

use crate::model::audit::{ApprovalStatus, ModificationStamp};
use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_amount, require_tenant, ValidationError};
use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: usize = 12;

/// Planned and executed totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    /// Month index, `0..=11`.
    pub month: u8,
    pub planned: f64,
    pub executed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixItem {
    pub id: String,
    pub company_id: TenantId,
    pub description: String,
    pub quantity: u32,
    pub unit_value: f64,
    /// Usually a cost-center code.
    pub category: String,
    /// Reference year.
    pub year: i32,
    #[serde(default)]
    pub is_recurring: bool,
    pub monthly_data: Vec<MonthlyValue>,
    pub status: ApprovalStatus,
    #[serde(flatten)]
    pub stamp: ModificationStamp,
}

impl MatrixItem {
    /// Creates a pending item planning `quantity * unit_value` every month.
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        description: impl Into<String>,
        quantity: u32,
        unit_value: f64,
        category: impl Into<String>,
        year: i32,
    ) -> Self {
        let planned = f64::from(quantity) * unit_value;
        Self {
            id: id.into(),
            company_id: company_id.into(),
            description: description.into(),
            quantity,
            unit_value,
            category: category.into(),
            year,
            is_recurring: true,
            monthly_data: (0..MONTHS_PER_YEAR as u8)
                .map(|month| MonthlyValue {
                    month,
                    planned,
                    executed: 0.0,
                })
                .collect(),
            status: ApprovalStatus::Pending,
            stamp: ModificationStamp::default(),
        }
    }

    pub fn month(&self, month: u8) -> Option<&MonthlyValue> {
        self.monthly_data.get(usize::from(month))
    }

    /// Overwrites the executed total of one month.
    ///
    /// # Errors
    /// - `MonthOutOfRange` when `month > 11`.
    pub fn record_execution(&mut self, month: u8, amount: f64) -> Result<(), ValidationError> {
        require_amount("matrix item", &self.id, "executed", amount)?;
        let entry = self
            .monthly_data
            .get_mut(usize::from(month))
            .ok_or(ValidationError::MonthOutOfRange(month))?;
        entry.executed = amount;
        Ok(())
    }

    /// Overwrites the planned total of one month.
    ///
    /// # Errors
    /// - `MonthOutOfRange` when `month > 11`.
    pub fn set_planned(&mut self, month: u8, amount: f64) -> Result<(), ValidationError> {
        require_amount("matrix item", &self.id, "planned", amount)?;
        let entry = self
            .monthly_data
            .get_mut(usize::from(month))
            .ok_or(ValidationError::MonthOutOfRange(month))?;
        entry.planned = amount;
        Ok(())
    }

    pub fn planned_total(&self) -> f64 {
        self.monthly_data.iter().map(|value| value.planned).sum()
    }

    pub fn executed_total(&self) -> f64 {
        self.monthly_data.iter().map(|value| value.executed).sum()
    }

    /// Planned minus executed; negative when the line overran its budget.
    pub fn variance(&self) -> f64 {
        self.planned_total() - self.executed_total()
    }
}

impl Record for MatrixItem {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("matrix item", &self.id, &self.company_id)?;
        if self.monthly_data.len() != MONTHS_PER_YEAR {
            return Err(ValidationError::MonthlyDataLength {
                id: self.id.clone(),
                len: self.monthly_data.len(),
            });
        }
        for (position, value) in self.monthly_data.iter().enumerate() {
            if usize::from(value.month) != position {
                return Err(ValidationError::MonthOutOfOrder {
                    id: self.id.clone(),
                    position,
                    month: value.month,
                });
            }
            require_amount("matrix item", &self.id, "planned", value.planned)?;
            require_amount("matrix item", &self.id, "executed", value.executed)?;
        }
        Ok(())
    }
}

impl TenantScoped for MatrixItem {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

/// Sums planned and executed totals per month across `items`.
///
/// Used for the company-wide matrix footer; items are expected to be one
/// tenant's slice.
pub fn monthly_totals(items: &[MatrixItem]) -> [MonthlyValue; MONTHS_PER_YEAR] {
    let mut totals = [MonthlyValue {
        month: 0,
        planned: 0.0,
        executed: 0.0,
    }; MONTHS_PER_YEAR];
    for (index, total) in totals.iter_mut().enumerate() {
        total.month = index as u8;
    }
    for item in items {
        for value in &item.monthly_data {
            if let Some(total) = totals.get_mut(usize::from(value.month)) {
                total.planned += value.planned;
                total.executed += value.executed;
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::{monthly_totals, MatrixItem, MONTHS_PER_YEAR};
    use crate::model::tenant::Record;
    use crate::model::validation::ValidationError;

    #[test]
    fn new_item_plans_twelve_equal_months() {
        let item = MatrixItem::new("mx1", "c1", "Office supplies", 10, 50.0, "CC-ADM-01", 2024);
        assert_eq!(item.monthly_data.len(), MONTHS_PER_YEAR);
        assert!(item.monthly_data.iter().all(|value| value.planned == 500.0));
        assert_eq!(item.planned_total(), 6_000.0);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn record_execution_updates_one_month_and_variance() {
        let mut item = MatrixItem::new("mx2", "c1", "SaaS", 1, 2_000.0, "CC-TI-02", 2024);
        item.record_execution(3, 1_950.0).unwrap();
        assert_eq!(item.month(3).map(|value| value.executed), Some(1_950.0));
        assert_eq!(item.executed_total(), 1_950.0);
        assert_eq!(item.variance(), 24_000.0 - 1_950.0);
    }

    #[test]
    fn record_execution_rejects_month_twelve() {
        let mut item = MatrixItem::new("mx3", "c1", "Cleaning", 1, 1_200.0, "CC-ADM-01", 2024);
        let err = item.record_execution(12, 10.0).unwrap_err();
        assert_eq!(err, ValidationError::MonthOutOfRange(12));
    }

    #[test]
    fn validate_rejects_truncated_and_shuffled_months() {
        let mut item = MatrixItem::new("mx4", "c1", "Fleet", 1, 100.0, "CC-LOG-05", 2024);
        item.monthly_data.pop();
        assert!(matches!(
            item.validate(),
            Err(ValidationError::MonthlyDataLength { len: 11, .. })
        ));

        let mut item = MatrixItem::new("mx5", "c1", "Fleet", 1, 100.0, "CC-LOG-05", 2024);
        item.monthly_data.swap(0, 1);
        assert!(matches!(
            item.validate(),
            Err(ValidationError::MonthOutOfOrder { position: 0, month: 1, .. })
        ));
    }

    #[test]
    fn monthly_totals_sum_across_items() {
        let mut first = MatrixItem::new("a", "c1", "A", 1, 100.0, "X", 2024);
        let second = MatrixItem::new("b", "c1", "B", 2, 50.0, "X", 2024);
        first.record_execution(0, 80.0).unwrap();

        let totals = monthly_totals(&[first, second]);
        assert_eq!(totals[0].planned, 200.0);
        assert_eq!(totals[0].executed, 80.0);
        assert_eq!(totals[11].month, 11);
    }
}
