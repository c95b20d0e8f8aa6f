//! Demo dataset used when no snapshot has been saved yet.
//!
//! # Responsibility
//! - Build a complete, valid snapshot for first start and load fallback.
//! - Hash seed credentials through the injected `PasswordHasher`.
//!
//! # Invariants
//! - Every record in the seed passes `Snapshot::validate()`.
//! - Dates are derived from the `today` argument so the dataset stays
//!   "current" whenever it is generated.

use crate::model::audit::{ApprovalStatus, Audit, AuditStatus, ChecklistEntry, ModificationStamp};
use crate::model::catalog::{ComplianceRule, CostCenter, Department};
use crate::model::history::{ActionKind, HistoryLog};
use crate::model::matrix::MatrixItem;
use crate::model::partner::{Partner, PartnerContract, PartnerSegment};
use crate::model::request::PurchaseRequest;
use crate::model::tenant::Company;
use crate::model::user::{User, UserRole};
use crate::store::Snapshot;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

pub const PRIMARY_TENANT: &str = "c1";
pub const SECONDARY_TENANT: &str = "c2";

/// Credential hashing collaborator.
///
/// The core treats the result as an opaque string.
pub trait PasswordHasher {
    fn hash(&self, password: &str) -> String;
}

impl<F> PasswordHasher for F
where
    F: Fn(&str) -> String,
{
    fn hash(&self, password: &str) -> String {
        self(password)
    }
}

/// Stores passwords unchanged; only for demos where credentials are never
/// checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughHasher;

impl PasswordHasher for PassthroughHasher {
    fn hash(&self, password: &str) -> String {
        password.to_string()
    }
}

/// Builds the demo snapshot relative to `now`.
pub fn seed_snapshot(now: DateTime<Utc>, hasher: &dyn PasswordHasher) -> Snapshot {
    let today = now.date_naive();
    Snapshot {
        companies: seed_companies(now),
        users: seed_users(hasher),
        audits: seed_audits(today),
        departments: seed_departments(),
        cost_centers: seed_cost_centers(),
        requests: seed_requests(),
        matrix_items: seed_matrix_items(today),
        compliance_rules: seed_compliance_rules(),
        partner_segments: seed_partner_segments(),
        partners: seed_partners(),
        partner_contracts: seed_partner_contracts(),
        history_logs: seed_history(now),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn day_of_month(reference: NaiveDate, day: u32) -> NaiveDate {
    reference.with_day(day).unwrap_or(reference)
}

fn seed_companies(now: DateTime<Utc>) -> Vec<Company> {
    vec![
        Company {
            created_at: now,
            ..Company::new(PRIMARY_TENANT, "Empresa Principal")
        },
        Company {
            created_at: now,
            ..Company::new(SECONDARY_TENANT, "Filial Secundaria")
        },
    ]
}

fn seed_users(hasher: &dyn PasswordHasher) -> Vec<User> {
    let with_password = |mut user: User, password: &str| {
        user.password = Some(hasher.hash(password));
        user
    };
    vec![
        with_password(
            User::new("u0", PRIMARY_TENANT, "Admin System", UserRole::Admin),
            "Adm123",
        ),
        with_password(
            User::new("u1", PRIMARY_TENANT, "Carlos Demo", UserRole::Demo),
            "123",
        ),
        with_password(
            User::new("u2", PRIMARY_TENANT, "Ana Planejamento", UserRole::Planner),
            "123",
        ),
        with_password(
            User::new("u3", PRIMARY_TENANT, "Roberto Compras", UserRole::Executor),
            "123",
        ),
        with_password(
            User::new("u4", SECONDARY_TENANT, "Admin Filial", UserRole::Admin),
            "Adm123",
        ),
    ]
}

fn seed_departments() -> Vec<Department> {
    vec![
        Department::new("d1", PRIMARY_TENANT, "Tecnologia"),
        Department::new("d2", PRIMARY_TENANT, "Recursos Humanos"),
        Department::new("d3", PRIMARY_TENANT, "Logistica"),
        Department::new("d4", PRIMARY_TENANT, "Marketing"),
        Department::new("d5", PRIMARY_TENANT, "Facilities"),
        Department::new("d6", SECONDARY_TENANT, "Operacoes"),
    ]
}

fn seed_cost_centers() -> Vec<CostCenter> {
    vec![
        CostCenter::new("cc1", PRIMARY_TENANT, "CC-TI-01", "Infraestrutura", "d1"),
        CostCenter::new("cc2", PRIMARY_TENANT, "CC-TI-02", "Software", "d1"),
        CostCenter::new("cc3", PRIMARY_TENANT, "CC-RH-01", "Treinamento", "d2"),
        CostCenter::new("cc4", PRIMARY_TENANT, "CC-LOG-05", "Frota", "d3"),
        CostCenter::new("cc5", PRIMARY_TENANT, "CC-MKT-03", "Publicidade", "d4"),
        CostCenter::new("cc6", PRIMARY_TENANT, "CC-ADM-01", "Escritorio", "d5"),
    ]
}

fn seed_requests() -> Vec<PurchaseRequest> {
    vec![
        PurchaseRequest {
            id: "r1".to_string(),
            company_id: PRIMARY_TENANT.to_string(),
            item: "Notebooks Dell Latitude".to_string(),
            amount: 15_000.0,
            department: "Tecnologia".to_string(),
            cost_center: "CC-TI-01".to_string(),
            requester_id: "u3".to_string(),
            requester_name: "Roberto Compras".to_string(),
            date: date(2024, 3, 20),
            status: ApprovalStatus::Pending,
            justification: "Renewal of the development team laptops.".to_string(),
            stamp: ModificationStamp::default(),
        },
        PurchaseRequest {
            id: "r2".to_string(),
            company_id: PRIMARY_TENANT.to_string(),
            item: "Adobe CC license".to_string(),
            amount: 4_500.0,
            department: "Marketing".to_string(),
            cost_center: "CC-MKT-03".to_string(),
            requester_id: "u2".to_string(),
            requester_name: "Ana Planejamento".to_string(),
            date: date(2024, 3, 18),
            status: ApprovalStatus::Approved,
            justification: "Design team.".to_string(),
            stamp: ModificationStamp::default(),
        },
    ]
}

fn seed_compliance_rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new("rule1", PRIMARY_TENANT, "Three quotes from different suppliers"),
        ComplianceRule::new("rule2", PRIMARY_TENANT, "Supplier tax standing verified"),
        ComplianceRule::new("rule3", PRIMARY_TENANT, "Service contract attached"),
        ComplianceRule::new("rule4", PRIMARY_TENANT, "Board approval recorded"),
        ComplianceRule::new("rule5", PRIMARY_TENANT, "Budget impact analysed"),
    ]
}

fn checklist(checked: &[(&str, bool)]) -> Vec<ChecklistEntry> {
    checked
        .iter()
        .map(|(rule_id, checked)| ChecklistEntry {
            rule_id: (*rule_id).to_string(),
            checked: *checked,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn negotiated_audit(
    id: &str,
    title: &str,
    department: &str,
    cost_center: &str,
    reference: NaiveDate,
    status: AuditStatus,
    budget: (f64, f64),
    quote: (f64, f64),
    negotiation: (ApprovalStatus, &str),
) -> Audit {
    let (planned_budget, executed_budget) = budget;
    let (initial_quote, final_price) = quote;
    let (negotiation_status, notes) = negotiation;
    let mut audit = Audit::planned(id, PRIMARY_TENANT, title, reference, planned_budget);
    audit.department = department.to_string();
    audit.cost_center = cost_center.to_string();
    audit.status = status;
    audit.executed_budget = executed_budget;
    audit.initial_quote = initial_quote;
    audit.final_price = final_price;
    audit.negotiation_status = negotiation_status;
    audit.negotiation_notes = notes.to_string();
    audit.saving_amount = audit.compute_saving();
    audit
}

fn seed_audits(today: NaiveDate) -> Vec<Audit> {
    let last_year = today.checked_sub_months(Months::new(12)).unwrap_or(today);

    let mut licenses = negotiated_audit(
        "1",
        "Microsoft software licenses",
        "Tecnologia",
        "CC-TI-02",
        day_of_month(today, 15),
        AuditStatus::Completed,
        (50_000.0, 42_000.0),
        (52_000.0, 42_000.0),
        (ApprovalStatus::Approved, "Volume renegotiation got a good discount."),
    );
    licenses.is_recurring = true;
    licenses.compliance_rating = Some(5);
    licenses.compliance_checklist = checklist(&[
        ("rule1", true),
        ("rule2", true),
        ("rule3", true),
        ("rule4", true),
        ("rule5", true),
    ]);

    let mut fleet = negotiated_audit(
        "2",
        "Fleet renewal",
        "Logistica",
        "CC-LOG-05",
        day_of_month(today, 10),
        AuditStatus::Completed,
        (25_000.0, 24_500.0),
        (26_000.0, 24_500.0),
        (ApprovalStatus::Approved, "Dealer matched a competitor offer."),
    );
    fleet.compliance_rating = Some(4);
    fleet.compliance_checklist = checklist(&[
        ("rule1", true),
        ("rule2", true),
        ("rule4", true),
        ("rule5", true),
    ]);

    let mut consulting = negotiated_audit(
        "3",
        "External HR consulting",
        "Recursos Humanos",
        "CC-RH-01",
        date(2023, 12, 10),
        AuditStatus::PartiallyExecuted,
        (15_000.0, 5_000.0),
        (15_000.0, 5_000.0),
        (ApprovalStatus::Pending, "Consulting partially contracted."),
    );
    consulting.compliance_rating = Some(3);
    consulting.compliance_checklist = checklist(&[("rule1", true), ("rule3", false)]);

    let mut cameras = Audit::planned(
        "4",
        PRIMARY_TENANT,
        "Security cameras",
        date(2024, 1, 20),
        30_000.0,
    );
    cameras.department = "Facilities".to_string();
    cameras.cost_center = "CC-ADM-01".to_string();
    cameras.initial_quote = 32_000.0;

    let mut campaign = negotiated_audit(
        "5",
        "Summer campaign",
        "Marketing",
        "CC-MKT-03",
        date(2024, 2, 15),
        AuditStatus::Completed,
        (120_000.0, 105_000.0),
        (130_000.0, 105_000.0),
        (ApprovalStatus::Approved, "Agency reduced scope."),
    );
    campaign.compliance_rating = Some(5);
    campaign.compliance_checklist = licenses.compliance_checklist.clone();

    let mut servers = negotiated_audit(
        "6",
        "Server maintenance (previous year)",
        "Tecnologia",
        "CC-TI-01",
        day_of_month(last_year, 5),
        AuditStatus::Completed,
        (20_000.0, 19_000.0),
        (21_000.0, 19_000.0),
        (ApprovalStatus::Approved, "Old contract, good discount."),
    );
    servers.is_recurring = true;
    servers.compliance_rating = Some(4);
    servers.compliance_checklist = checklist(&[("rule1", true), ("rule2", true)]);

    vec![licenses, fleet, consulting, cameras, campaign, servers]
}

fn seed_matrix_items(today: NaiveDate) -> Vec<MatrixItem> {
    let current_month = today.month0() as u8;
    let build = |id: &str,
                 description: &str,
                 unit: (u32, f64),
                 category: &str,
                 executed: (f64, f64),
                 status: ApprovalStatus| {
        let (quantity, unit_value) = unit;
        let (past, current) = executed;
        let mut item = MatrixItem::new(
            id,
            PRIMARY_TENANT,
            description,
            quantity,
            unit_value,
            category,
            today.year(),
        );
        for value in &mut item.monthly_data {
            value.executed = if value.month == current_month {
                current
            } else if value.month < current_month {
                past
            } else {
                0.0
            };
        }
        item.status = status;
        item
    };

    vec![
        build(
            "mx1",
            "Office supplies",
            (10, 50.0),
            "CC-ADM-01",
            (510.0, 480.0),
            ApprovalStatus::Approved,
        ),
        build(
            "mx2",
            "SaaS subscriptions",
            (1, 2_000.0),
            "CC-TI-02",
            (2_000.0, 1_950.0),
            ApprovalStatus::Pending,
        ),
        build(
            "mx3",
            "Cleaning services",
            (1, 1_200.0),
            "CC-ADM-01",
            (1_180.0, 1_250.0),
            ApprovalStatus::Approved,
        ),
    ]
}

fn seed_partner_segments() -> Vec<PartnerSegment> {
    vec![
        PartnerSegment::new("ps1", PRIMARY_TENANT, "Technology & Software"),
        PartnerSegment::new("ps2", PRIMARY_TENANT, "Consulting"),
        PartnerSegment::new("ps3", PRIMARY_TENANT, "Office Supplies"),
        PartnerSegment::new("ps4", PRIMARY_TENANT, "General Services"),
    ]
}

fn seed_partners() -> Vec<Partner> {
    let partner = |id: &str, name: &str, segment: &str, person: &str, email: &str, notes: &str| {
        Partner {
            id: id.to_string(),
            company_id: PRIMARY_TENANT.to_string(),
            name: name.to_string(),
            segment_id: segment.to_string(),
            contact_person: person.to_string(),
            contact_email: email.to_string(),
            notes: Some(notes.to_string()),
            stamp: ModificationStamp::default(),
        }
    };
    vec![
        partner(
            "p1",
            "Tech Solutions S.A.",
            "ps1",
            "Joao Silva",
            "joao.silva@techsol.com",
            "Main supplier of licenses and IT infrastructure.",
        ),
        partner(
            "p2",
            "Consultoria Estrategica LTDA",
            "ps2",
            "Mariana Costa",
            "mariana.costa@consultoria.com",
            "Partner for HR and strategic planning projects.",
        ),
        partner(
            "p3",
            "Office Supplies Distribuidora",
            "ps3",
            "Carlos Oliveira",
            "carlos.oliveira@officesupplies.com",
            "Office and cleaning supplies.",
        ),
        partner(
            "p4",
            "Sample Supplier",
            "ps4",
            "Test",
            "teste@exemplo.com",
            "Created this year for metrics testing.",
        ),
    ]
}

fn seed_partner_contracts() -> Vec<PartnerContract> {
    let contract = |id: &str,
                    partner_id: &str,
                    description: &str,
                    window: (NaiveDate, NaiveDate),
                    value: f64,
                    items: &str| PartnerContract {
        id: id.to_string(),
        company_id: PRIMARY_TENANT.to_string(),
        partner_id: partner_id.to_string(),
        description: description.to_string(),
        start_date: window.0,
        end_date: window.1,
        value,
        items_purchased: items.to_string(),
        attachments: Vec::new(),
        stamp: ModificationStamp::default(),
    };
    vec![
        contract(
            "pc1",
            "p1",
            "Annual corporate software licenses",
            (date(2024, 1, 1), date(2024, 12, 31)),
            50_000.0,
            "MS Office 365, Azure Credits",
        ),
        contract(
            "pc2",
            "p1",
            "Cloud server maintenance",
            (date(2024, 3, 1), date(2025, 2, 28)),
            20_000.0,
            "24/7 support, monitoring",
        ),
        contract(
            "pc3",
            "p2",
            "Organizational restructuring project",
            (date(2024, 4, 15), date(2024, 7, 15)),
            35_000.0,
            "Workshops, assessment, action plan",
        ),
    ]
}

/// Default history entries, most recent first, dated relative to `now`.
pub fn seed_history(now: DateTime<Utc>) -> Vec<HistoryLog> {
    let entry = |id: &str,
                 age: Duration,
                 user: (&str, &str, &str),
                 action: ActionKind,
                 target: &str,
                 details: &str| HistoryLog {
        id: id.to_string(),
        company_id: PRIMARY_TENANT.to_string(),
        timestamp: now - age,
        user_id: user.0.to_string(),
        user_name: user.1.to_string(),
        user_avatar: user.2.to_string(),
        action,
        target: target.to_string(),
        details: details.to_string(),
        item_id: None,
    };
    vec![
        entry(
            "h1",
            Duration::hours(1),
            ("u2", "Ana Planejamento", "AP"),
            ActionKind::Create,
            "Planning: Marketing campaign",
            "Created a new budget planning record",
        ),
        entry(
            "h2",
            Duration::hours(2),
            ("u3", "Roberto Compras", "RC"),
            ActionKind::Update,
            "Negotiation: Software licenses",
            "Updated negotiated value to 42000",
        ),
        entry(
            "h3",
            Duration::days(1),
            ("u1", "Carlos Demo", "CD"),
            ActionKind::Delete,
            "Partner: Former supplier",
            "Removed partner and linked contracts",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{seed_snapshot, PassthroughHasher, PRIMARY_TENANT, SECONDARY_TENANT};
    use crate::store::CollectionKind;
    use chrono::{TimeZone, Utc};

    #[test]
    fn seed_is_valid_and_fills_every_collection() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let snapshot = seed_snapshot(now, &PassthroughHasher);
        snapshot.validate().expect("seed must validate");
        for kind in CollectionKind::ALL {
            assert!(snapshot.len_of(kind) > 0, "{} is empty", kind.as_str());
        }
    }

    #[test]
    fn seed_history_is_most_recent_first() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let snapshot = seed_snapshot(now, &PassthroughHasher);
        let stamps: Vec<_> = snapshot.history_logs.iter().map(|h| h.timestamp).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn seed_passwords_go_through_hasher() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let hasher = |password: &str| format!("hashed:{password}");
        let snapshot = seed_snapshot(now, &hasher);
        assert!(snapshot
            .users
            .iter()
            .all(|user| user.password.as_deref().unwrap_or("").starts_with("hashed:")));
    }

    #[test]
    fn seed_matrix_executes_only_elapsed_months() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let snapshot = seed_snapshot(now, &PassthroughHasher);
        let office = &snapshot.matrix_items[0];
        assert_eq!(office.month(4).map(|m| m.executed), Some(510.0));
        assert_eq!(office.month(5).map(|m| m.executed), Some(480.0));
        assert_eq!(office.month(6).map(|m| m.executed), Some(0.0));
        assert_eq!(office.year, 2024);
    }

    #[test]
    fn seed_spans_two_tenants() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let snapshot = seed_snapshot(now, &PassthroughHasher);
        assert!(snapshot.users.iter().any(|u| u.company_id == PRIMARY_TENANT));
        assert!(snapshot.users.iter().any(|u| u.company_id == SECONDARY_TENANT));
    }
}
