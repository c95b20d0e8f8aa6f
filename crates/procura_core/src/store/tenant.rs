//! Pure tenant filtering and merge helpers.

use crate::model::tenant::TenantScoped;
use crate::model::validation::require_id;
use crate::store::snapshot::CollectionKind;
use crate::store::{StoreError, StoreResult};
use std::collections::HashSet;

/// Returns the records owned by `tenant_id`, in their original order.
///
/// A blank `tenant_id` yields an empty list (nobody logged in).
pub fn filter_by_tenant<T: TenantScoped>(items: &[T], tenant_id: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.belongs_to(tenant_id))
        .cloned()
        .collect()
}

/// Replaces the tenant's records in `items` with `slice`.
///
/// Other tenants' records keep their relative order and come first; `slice`
/// is appended after them as given.
pub fn merge_tenant_slice<T: TenantScoped>(items: &mut Vec<T>, tenant_id: &str, slice: Vec<T>) {
    items.retain(|item| !item.belongs_to(tenant_id));
    items.extend(slice);
}

/// Checks that `slice` can become the tenant's records in `existing`.
///
/// Only structure is checked: ownership, non-blank ids and id uniqueness
/// across the merged collection. Domain rules stay with the workflows that
/// build the records.
pub(crate) fn ensure_slice_fits<T: TenantScoped>(
    collection: CollectionKind,
    tenant_id: &str,
    slice: &[T],
    existing: &[T],
) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(slice.len());
    for item in slice {
        if item.company_id() != tenant_id {
            return Err(StoreError::TenantMismatch {
                collection,
                record_id: item.record_id().to_string(),
                expected: tenant_id.to_string(),
                found: item.company_id().to_string(),
            });
        }
        require_id(collection.as_str(), item.record_id())?;
        if !seen.insert(item.record_id()) {
            return Err(StoreError::DuplicateId {
                collection,
                record_id: item.record_id().to_string(),
            });
        }
    }

    if let Some(clash) = existing
        .iter()
        .filter(|item| !item.belongs_to(tenant_id))
        .find(|item| seen.contains(item.record_id()))
    {
        return Err(StoreError::DuplicateId {
            collection,
            record_id: clash.record_id().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_slice_fits, filter_by_tenant, merge_tenant_slice};
    use crate::model::validation::ValidationError;
    use crate::model::catalog::Department;
    use crate::store::snapshot::CollectionKind;
    use crate::store::StoreError;

    fn ids(items: &[Department]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    fn sample() -> Vec<Department> {
        vec![
            Department::new("d1", "c1", "IT"),
            Department::new("d2", "c2", "HR"),
            Department::new("d3", "c1", "Logistics"),
        ]
    }

    #[test]
    fn filter_keeps_order_and_blank_tenant_sees_nothing() {
        let items = sample();
        assert_eq!(ids(&filter_by_tenant(&items, "c1")), vec!["d1", "d3"]);
        assert!(filter_by_tenant(&items, "").is_empty());
        assert!(filter_by_tenant(&items, "c404").is_empty());
    }

    #[test]
    fn merge_puts_other_tenants_first() {
        let mut items = sample();
        merge_tenant_slice(&mut items, "c1", vec![Department::new("d9", "c1", "New")]);
        assert_eq!(ids(&items), vec!["d2", "d9"]);
    }

    #[test]
    fn merge_with_blank_tenant_keeps_everything() {
        let mut items = sample();
        merge_tenant_slice(&mut items, "", Vec::new());
        assert_eq!(ids(&items), vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn ownership_check_reports_foreign_record() {
        let slice = vec![Department::new("d2", "c2", "HR")];
        let err =
            ensure_slice_fits(CollectionKind::Departments, "c1", &slice, &sample()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::TenantMismatch { ref record_id, ref found, .. }
                if record_id == "d2" && found == "c2"
        ));
    }

    #[test]
    fn slice_ids_must_be_present_and_unique() {
        let existing = sample();
        let check = |slice: Vec<Department>| {
            ensure_slice_fits(CollectionKind::Departments, "c1", &slice, &existing)
        };

        assert!(matches!(
            check(vec![Department::new(" ", "c1", "Blank")]),
            Err(StoreError::Validation(ValidationError::EmptyId { .. }))
        ));
        assert!(matches!(
            check(vec![Department::new("d7", "c1", "A"), Department::new("d7", "c1", "B")]),
            Err(StoreError::DuplicateId { ref record_id, .. }) if record_id == "d7"
        ));
        assert!(matches!(
            check(vec![Department::new("d2", "c1", "Taken by c2")]),
            Err(StoreError::DuplicateId { ref record_id, .. }) if record_id == "d2"
        ));
        // Reusing the tenant's own ids is a normal rewrite.
        assert!(check(vec![
            Department::new("d1", "c1", "IT"),
            Department::new("d3", "c1", "Ops"),
        ])
        .is_ok());
    }
}
