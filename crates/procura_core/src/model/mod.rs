//! Domain model for the procurement/audit collections.
//!
//! # Responsibility
//! - Define the canonical records held by the entity store.
//! - Expose tenant ownership through one trait so store logic stays generic.
//!
//! # Invariants
//! - Every tenant-tagged record belongs to exactly one company for its
//!   whole lifetime; `company_id` is never rewritten after creation.
//! - Cross-record references are plain string ids resolved at read time.
//!
//! # See also
//! - `crate::store` for tenant-scoped reads and writes.

pub mod audit;
pub mod catalog;
pub mod history;
pub mod matrix;
pub mod partner;
pub mod request;
pub mod tenant;
pub mod user;
pub mod validation;
