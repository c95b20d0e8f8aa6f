//! Persistence gateway contracts and implementations.
//!
//! # Responsibility
//! - Define the whole-snapshot load/save contract used at startup and after
//!   every mutation.
//! - Keep SQLite and JSON encoding details behind that contract.
//!
//! # Invariants
//! - A save either replaces the whole persisted snapshot or leaves the
//!   previous one intact.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod snapshot_repo;
