//! Core state layer for the Procura procurement and audit platform.
//! Tenant isolation, history and persistence rules live here.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;

pub use app::{AppError, AppResult, Notice, NoticeLevel, ProcuraApp};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::history::{ActionKind, HistoryLog};
pub use model::tenant::{Company, Record, TenantId, TenantScoped};
pub use model::user::{User, UserRole, UserStatus};
pub use model::validation::ValidationError;
pub use repo::snapshot_repo::{
    InMemorySnapshotRepository, RepoError, RepoResult, SaveRecord, SnapshotGateway,
    SqliteSnapshotRepository,
};
pub use seed::{seed_snapshot, PassthroughHasher, PasswordHasher};
pub use service::history_service::HistoryRecorder;
pub use store::{
    filter_by_tenant, Collection, CollectionKind, EntityStore, Snapshot, StoreError, StoreResult,
    TenantWritable,
};

/// Minimal health-check API for embedding hosts.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
