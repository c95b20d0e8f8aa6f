//! In-memory entity store with tenant-scoped access.
//!
//! # Responsibility
//! - Hold every domain collection as the single source of truth.
//! - Derive per-tenant views and merge tenant slices back into the
//!   multi-tenant collections.
//!
//! # Invariants
//! - A tenant-scoped write never alters or drops another tenant's records.
//! - After a tenant-scoped write the collection reads `others ++ slice`:
//!   records of other tenants first (original order), then the new slice.
//! - Writes that would hand a record to a different tenant, or reuse an id
//!   already taken in the collection, are rejected before anything changes.
//! - History is append-only here: it is excluded from tenant slice writes.

use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod entity_store;
pub mod snapshot;
pub mod tenant;

pub use entity_store::EntityStore;
pub use snapshot::{Collection, CollectionKind, Snapshot, TenantWritable};
pub use tenant::filter_by_tenant;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A record in a tenant slice is owned by another company.
    TenantMismatch {
        collection: CollectionKind,
        record_id: String,
        expected: String,
        found: String,
    },
    /// A record id appears twice in the merged collection.
    DuplicateId {
        collection: CollectionKind,
        record_id: String,
    },
    Validation(ValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TenantMismatch {
                collection,
                record_id,
                expected,
                found,
            } => write!(
                f,
                "{} record `{record_id}` belongs to `{found}`, expected tenant `{expected}`",
                collection.as_str()
            ),
            Self::DuplicateId {
                collection,
                record_id,
            } => write!(
                f,
                "{} record id `{record_id}` is already in use",
                collection.as_str()
            ),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::TenantMismatch { .. } | Self::DuplicateId { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
