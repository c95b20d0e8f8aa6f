//! Organization catalog records configured per tenant in settings.

use crate::model::tenant::{Record, TenantId, TenantScoped};
use crate::model::validation::{require_tenant, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub company_id: TenantId,
    pub name: String,
}

/// Cost center grouped under one department.
///
/// `code` is what audits and requests reference; `department_id` is resolved
/// by lookup and may dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCenter {
    pub id: String,
    pub company_id: TenantId,
    pub code: String,
    pub name: String,
    pub department_id: String,
}

/// Checklist rule evaluated during negotiation compliance review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRule {
    pub id: String,
    pub company_id: TenantId,
    pub description: String,
}

impl Department {
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

impl CostCenter {
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        code: impl Into<String>,
        name: impl Into<String>,
        department_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            code: code.into(),
            name: name.into(),
            department_id: department_id.into(),
        }
    }
}

impl ComplianceRule {
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<TenantId>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            description: description.into(),
        }
    }
}

impl Record for Department {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("department", &self.id, &self.company_id)
    }
}

impl TenantScoped for Department {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Record for CostCenter {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("cost center", &self.id, &self.company_id)
    }
}

impl TenantScoped for CostCenter {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Record for ComplianceRule {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_tenant("compliance rule", &self.id, &self.company_id)
    }
}

impl TenantScoped for ComplianceRule {
    fn company_id(&self) -> &str {
        &self.company_id
    }
}

/// Resolves the department owning a cost-center code, if both exist.
pub fn department_for_code<'a>(
    code: &str,
    cost_centers: &[CostCenter],
    departments: &'a [Department],
) -> Option<&'a Department> {
    let center = cost_centers.iter().find(|center| center.code == code)?;
    departments
        .iter()
        .find(|department| department.id == center.department_id)
}

#[cfg(test)]
mod tests {
    use super::{department_for_code, CostCenter, Department};

    #[test]
    fn department_lookup_follows_code_then_id() {
        let departments = vec![Department::new("d1", "c1", "Tecnologia")];
        let centers = vec![
            CostCenter::new("cc1", "c1", "CC-TI-01", "Infraestrutura", "d1"),
            CostCenter::new("cc9", "c1", "CC-X", "Orphan", "d404"),
        ];

        let found = department_for_code("CC-TI-01", &centers, &departments);
        assert_eq!(found.map(|d| d.name.as_str()), Some("Tecnologia"));
        assert!(department_for_code("CC-X", &centers, &departments).is_none());
        assert!(department_for_code("missing", &centers, &departments).is_none());
    }
}
