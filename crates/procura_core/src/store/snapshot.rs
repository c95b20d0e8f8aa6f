//! Whole-store snapshot and typed collection selectors.
//!
//! # Responsibility
//! - Define the fixed set of twelve named collections persisted together.
//! - Map each record type to its collection through `Collection`.
//! - Mark which tenant collections accept slice rewrites (`TenantWritable`).
//!
//! # Invariants
//! - Serialized keys are the camelCase collection names in
//!   `CollectionKind::as_str()`.
//! - Decoding needs all twelve collections; filling a missing history is
//!   the gateway's job.
//! - `HistoryLog` is not `TenantWritable`; history only grows through
//!   `HistoryRecorder`.

use crate::model::audit::Audit;
use crate::model::catalog::{ComplianceRule, CostCenter, Department};
use crate::model::history::HistoryLog;
use crate::model::matrix::MatrixItem;
use crate::model::partner::{Partner, PartnerContract, PartnerSegment};
use crate::model::request::PurchaseRequest;
use crate::model::tenant::{Company, Record, TenantScoped};
use crate::model::user::User;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Name of one persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    Companies,
    Users,
    Audits,
    Departments,
    CostCenters,
    Requests,
    MatrixItems,
    ComplianceRules,
    PartnerSegments,
    Partners,
    PartnerContracts,
    HistoryLogs,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 12] = [
        Self::Companies,
        Self::Users,
        Self::Audits,
        Self::Departments,
        Self::CostCenters,
        Self::Requests,
        Self::MatrixItems,
        Self::ComplianceRules,
        Self::PartnerSegments,
        Self::Partners,
        Self::PartnerContracts,
        Self::HistoryLogs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Users => "users",
            Self::Audits => "audits",
            Self::Departments => "departments",
            Self::CostCenters => "costCenters",
            Self::Requests => "requests",
            Self::MatrixItems => "matrixItems",
            Self::ComplianceRules => "complianceRules",
            Self::PartnerSegments => "partnerSegments",
            Self::Partners => "partners",
            Self::PartnerContracts => "partnerContracts",
            Self::HistoryLogs => "historyLogs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Collections that must be present in a persisted snapshot.
    pub fn is_required(self) -> bool {
        self != Self::HistoryLogs
    }
}

/// Full store contents, the unit of load and save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub companies: Vec<Company>,
    pub users: Vec<User>,
    pub audits: Vec<Audit>,
    pub departments: Vec<Department>,
    pub cost_centers: Vec<CostCenter>,
    pub requests: Vec<PurchaseRequest>,
    pub matrix_items: Vec<MatrixItem>,
    pub compliance_rules: Vec<ComplianceRule>,
    pub partner_segments: Vec<PartnerSegment>,
    pub partners: Vec<Partner>,
    pub partner_contracts: Vec<PartnerContract>,
    pub history_logs: Vec<HistoryLog>,
}

impl Snapshot {
    pub fn len_of(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Companies => self.companies.len(),
            CollectionKind::Users => self.users.len(),
            CollectionKind::Audits => self.audits.len(),
            CollectionKind::Departments => self.departments.len(),
            CollectionKind::CostCenters => self.cost_centers.len(),
            CollectionKind::Requests => self.requests.len(),
            CollectionKind::MatrixItems => self.matrix_items.len(),
            CollectionKind::ComplianceRules => self.compliance_rules.len(),
            CollectionKind::PartnerSegments => self.partner_segments.len(),
            CollectionKind::Partners => self.partners.len(),
            CollectionKind::PartnerContracts => self.partner_contracts.len(),
            CollectionKind::HistoryLogs => self.history_logs.len(),
        }
    }

    /// Total record count over all collections.
    pub fn total_len(&self) -> usize {
        CollectionKind::ALL
            .into_iter()
            .map(|kind| self.len_of(kind))
            .sum()
    }

    /// Number of records owned by `tenant_id` per tenant-tagged collection.
    pub fn tenant_counts(&self, tenant_id: &str) -> Vec<(CollectionKind, usize)> {
        fn owned<T: TenantScoped>(items: &[T], tenant_id: &str) -> usize {
            items.iter().filter(|item| item.belongs_to(tenant_id)).count()
        }

        vec![
            (CollectionKind::Users, owned(&self.users, tenant_id)),
            (CollectionKind::Audits, owned(&self.audits, tenant_id)),
            (CollectionKind::Departments, owned(&self.departments, tenant_id)),
            (CollectionKind::CostCenters, owned(&self.cost_centers, tenant_id)),
            (CollectionKind::Requests, owned(&self.requests, tenant_id)),
            (CollectionKind::MatrixItems, owned(&self.matrix_items, tenant_id)),
            (
                CollectionKind::ComplianceRules,
                owned(&self.compliance_rules, tenant_id),
            ),
            (
                CollectionKind::PartnerSegments,
                owned(&self.partner_segments, tenant_id),
            ),
            (CollectionKind::Partners, owned(&self.partners, tenant_id)),
            (
                CollectionKind::PartnerContracts,
                owned(&self.partner_contracts, tenant_id),
            ),
            (CollectionKind::HistoryLogs, owned(&self.history_logs, tenant_id)),
        ]
    }

    /// Validates every record of every collection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn all<T: Record>(items: &[T]) -> Result<(), ValidationError> {
            items.iter().try_for_each(|item| item.validate())
        }

        all(&self.companies)?;
        all(&self.users)?;
        all(&self.audits)?;
        all(&self.departments)?;
        all(&self.cost_centers)?;
        all(&self.requests)?;
        all(&self.matrix_items)?;
        all(&self.compliance_rules)?;
        all(&self.partner_segments)?;
        all(&self.partners)?;
        all(&self.partner_contracts)?;
        all(&self.history_logs)
    }
}

/// Record type stored in one named snapshot collection.
pub trait Collection: Record {
    const KIND: CollectionKind;

    fn items(snapshot: &Snapshot) -> &Vec<Self>;

    fn items_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! impl_collection {
    ($ty:ty, $field:ident, $kind:ident) => {
        impl Collection for $ty {
            const KIND: CollectionKind = CollectionKind::$kind;

            fn items(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn items_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

impl_collection!(Company, companies, Companies);
impl_collection!(User, users, Users);
impl_collection!(Audit, audits, Audits);
impl_collection!(Department, departments, Departments);
impl_collection!(CostCenter, cost_centers, CostCenters);
impl_collection!(PurchaseRequest, requests, Requests);
impl_collection!(MatrixItem, matrix_items, MatrixItems);
impl_collection!(ComplianceRule, compliance_rules, ComplianceRules);
impl_collection!(PartnerSegment, partner_segments, PartnerSegments);
impl_collection!(Partner, partners, Partners);
impl_collection!(PartnerContract, partner_contracts, PartnerContracts);
impl_collection!(HistoryLog, history_logs, HistoryLogs);

/// Tenant-tagged collection that callers may rewrite one tenant slice at a
/// time.
///
/// History entries are never rewritten by normal flows, so `HistoryLog`
/// does not implement this trait:
///
/// ```compile_fail
/// use procura_core::{HistoryLog, InMemorySnapshotRepository, PassthroughHasher, ProcuraApp};
///
/// let mut app = ProcuraApp::bootstrap(InMemorySnapshotRepository::new(), &PassthroughHasher);
/// app.update_tenant_slice::<HistoryLog, _>(|_| Vec::new());
/// ```
pub trait TenantWritable: Collection + TenantScoped {}

macro_rules! impl_tenant_writable {
    ($($ty:ty),+ $(,)?) => {
        $(impl TenantWritable for $ty {})+
    };
}

impl_tenant_writable!(
    User,
    Audit,
    Department,
    CostCenter,
    PurchaseRequest,
    MatrixItem,
    ComplianceRule,
    PartnerSegment,
    Partner,
    PartnerContract,
);

#[cfg(test)]
mod tests {
    use super::{CollectionKind, Snapshot};

    #[test]
    fn collection_names_round_trip_through_parse() {
        for kind in CollectionKind::ALL {
            assert_eq!(CollectionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CollectionKind::parse("atoms"), None);
    }

    #[test]
    fn serialized_keys_match_collection_names() {
        let json = serde_json::to_value(Snapshot::default()).expect("snapshot serializes");
        let object = json.as_object().expect("snapshot is an object");
        assert_eq!(object.len(), CollectionKind::ALL.len());
        for kind in CollectionKind::ALL {
            assert!(object.contains_key(kind.as_str()), "missing {}", kind.as_str());
        }
    }

    #[test]
    fn missing_history_does_not_decode() {
        let mut json = serde_json::to_value(Snapshot::default()).expect("snapshot serializes");
        json.as_object_mut()
            .expect("snapshot is an object")
            .remove("historyLogs");
        let err = serde_json::from_value::<Snapshot>(json).unwrap_err();
        assert!(err.to_string().contains("historyLogs"));
    }
}
