//! Entity store holding the canonical multi-tenant collections.
//!
//! # Responsibility
//! - Own the current `Snapshot`.
//! - Provide whole-collection overwrite for administrative flows and
//!   tenant-scoped set/update for everything else.
//!
//! # Invariants
//! - Every write is last-write-wins over a whole collection.
//! - A failed tenant-scoped write leaves the collection untouched.
//! - Record ids stay unique inside a collection across tenant writes.
//! - History only changes through `history_mut`, newest entry first.

use crate::model::history::HistoryLog;
use crate::model::tenant::TenantScoped;
use crate::store::snapshot::{Collection, Snapshot, TenantWritable};
use crate::store::tenant::{ensure_slice_fits, filter_by_tenant, merge_tenant_slice};
use crate::store::StoreResult;
use log::debug;

/// In-memory source of truth for all collections.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    snapshot: Snapshot,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store populated from a previously saved snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Overwrites every collection with `snapshot` (restore-on-load).
    pub fn restore(&mut self, snapshot: Snapshot) {
        debug!(
            "event=store_restore module=store status=ok records={}",
            snapshot.total_len()
        );
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Full collection across all tenants.
    pub fn collection<T: Collection>(&self) -> &[T] {
        T::items(&self.snapshot)
    }

    /// Records of `T` owned by `tenant_id`, in collection order.
    pub fn tenant_view<T: Collection + TenantScoped>(&self, tenant_id: &str) -> Vec<T> {
        filter_by_tenant(T::items(&self.snapshot), tenant_id)
    }

    /// Finds one record by id across all tenants.
    pub fn find<T: Collection>(&self, id: &str) -> Option<&T> {
        T::items(&self.snapshot)
            .iter()
            .find(|item| item.record_id() == id)
    }

    /// Unconditionally overwrites one collection.
    ///
    /// Reserved for tenant-unaware administrative flows (company list,
    /// global user list).
    pub fn replace_collection<T: Collection>(&mut self, items: Vec<T>) {
        debug!(
            "event=collection_replace module=store status=ok collection={} records={}",
            T::KIND.as_str(),
            items.len()
        );
        *T::items_mut(&mut self.snapshot) = items;
    }

    /// Replaces the tenant's slice of `T` with `slice`.
    ///
    /// The collection afterwards reads `others ++ slice`.
    ///
    /// # Errors
    /// - `TenantMismatch` when a record in `slice` belongs to another tenant.
    /// - `Validation` when a record in `slice` has a blank id.
    /// - `DuplicateId` when an id repeats in `slice` or is used by another
    ///   tenant's record.
    pub fn set_tenant_slice<T: TenantWritable>(
        &mut self,
        tenant_id: &str,
        slice: Vec<T>,
    ) -> StoreResult<()> {
        ensure_slice_fits(T::KIND, tenant_id, &slice, T::items(&self.snapshot))?;
        let slice_len = slice.len();
        let items = T::items_mut(&mut self.snapshot);
        merge_tenant_slice(items, tenant_id, slice);
        debug!(
            "event=tenant_slice_write module=store status=ok collection={} tenant={} slice={} total={}",
            T::KIND.as_str(),
            tenant_id,
            slice_len,
            items.len()
        );
        Ok(())
    }

    /// Derives a new tenant slice from the current one and merges it back.
    ///
    /// `update` receives a copy of the tenant's current records, so the
    /// collection is unchanged if the result is rejected.
    ///
    /// # Errors
    /// Same as [`EntityStore::set_tenant_slice`].
    pub fn update_tenant_slice<T, F>(&mut self, tenant_id: &str, update: F) -> StoreResult<()>
    where
        T: TenantWritable,
        F: FnOnce(Vec<T>) -> Vec<T>,
    {
        let current = self.tenant_view::<T>(tenant_id);
        let next = update(current);
        self.set_tenant_slice(tenant_id, next)
    }

    /// Removes the record with `id`, leaving every other record untouched.
    pub fn remove_by_id<T: Collection>(&mut self, id: &str) -> Option<T> {
        let items = T::items_mut(&mut self.snapshot);
        let position = items.iter().position(|item| item.record_id() == id)?;
        Some(items.remove(position))
    }

    /// Mutable access to the history log for the recorder.
    pub(crate) fn history_mut(&mut self) -> &mut Vec<HistoryLog> {
        &mut self.snapshot.history_logs
    }
}

#[cfg(test)]
mod tests {
    use super::EntityStore;
    use crate::model::catalog::ComplianceRule;
    use crate::store::StoreError;

    fn rule(id: &str, tenant: &str) -> ComplianceRule {
        ComplianceRule::new(id, tenant, format!("rule {id}"))
    }

    #[test]
    fn rejected_slice_leaves_collection_unchanged() {
        let mut store = EntityStore::new();
        store.replace_collection(vec![rule("r1", "c1"), rule("r2", "c2"), rule("r3", "c1")]);
        let before = store.collection::<ComplianceRule>().to_vec();

        let err = store
            .update_tenant_slice::<ComplianceRule, _>("c1", |mut mine| {
                mine.push(rule("r4", "c2"));
                mine
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::TenantMismatch { .. }));
        assert_eq!(store.collection::<ComplianceRule>(), before.as_slice());
    }

    #[test]
    fn remove_by_id_drops_only_that_record() {
        let mut store = EntityStore::new();
        store.replace_collection(vec![rule("r1", "c1"), rule("r2", "c2")]);

        let removed = store.remove_by_id::<ComplianceRule>("r1");
        assert_eq!(removed.map(|r| r.id), Some("r1".to_string()));
        assert!(store.remove_by_id::<ComplianceRule>("r1").is_none());
        assert_eq!(store.collection::<ComplianceRule>().len(), 1);
    }
}
