//! Snapshot gateway contract with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Load the last saved snapshot, or report that none exists.
//! - Save a full snapshot atomically.
//!
//! # Invariants
//! - SQLite layout: one `snapshot_collections` row per collection, JSON payload.
//! - `save_all` rewrites all rows and the `snapshot_saves` bookkeeping row
//!   in one transaction.
//! - `load_all` returns `None` only when no rows exist at all.
//! - A stored snapshot without a `historyLogs` row loads with the default
//!   history.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::validation::ValidationError;
use crate::seed::seed_history;
use crate::store::{CollectionKind, Snapshot};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error raised by snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    Serialization(serde_json::Error),
    InvalidData(String),
    /// Backend refused the operation (e.g. storage not reachable).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "invalid persisted snapshot: {err}"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
            Self::Unavailable(message) => write!(f, "snapshot storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Bookkeeping written next to every SQLite save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub saved_at: DateTime<Utc>,
    /// Core version of the build that wrote the snapshot.
    pub core_version: String,
    pub total_records: usize,
}

/// Whole-snapshot persistence gateway.
pub trait SnapshotGateway {
    /// Returns the last saved snapshot, or `None` on a fresh install.
    fn load_all(&self) -> RepoResult<Option<Snapshot>>;

    /// Replaces the persisted snapshot with `snapshot`.
    fn save_all(&mut self, snapshot: &Snapshot) -> RepoResult<()>;
}

/// SQLite-backed snapshot gateway.
pub struct SqliteSnapshotRepository {
    conn: Connection,
}

impl SqliteSnapshotRepository {
    /// Opens a snapshot file, applying migrations first.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a process-local snapshot database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection that already went through `open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Metadata of the most recent successful save, if any.
    pub fn last_save(&self) -> RepoResult<Option<SaveRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT saved_at, core_version, total_records FROM snapshot_saves WHERE id = 1;",
        )?;
        let mut rows = stmt.query([])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let saved_at_ms: i64 = row.get("saved_at")?;
        let total_records: i64 = row.get("total_records")?;
        let saved_at = DateTime::<Utc>::from_timestamp_millis(saved_at_ms).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid snapshot_saves.saved_at `{saved_at_ms}`"))
        })?;
        let total_records = usize::try_from(total_records).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid snapshot_saves.total_records `{total_records}`"
            ))
        })?;
        Ok(Some(SaveRecord {
            saved_at,
            core_version: row.get("core_version")?,
            total_records,
        }))
    }
}

impl SnapshotGateway for SqliteSnapshotRepository {
    fn load_all(&self) -> RepoResult<Option<Snapshot>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, payload FROM snapshot_collections;")?;
        let mut rows = stmt.query([])?;
        let mut document = Map::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            let payload: String = row.get("payload")?;
            let kind = CollectionKind::parse(&name).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "unknown collection `{name}` in snapshot_collections.name"
                ))
            })?;
            let value: Value = serde_json::from_str(&payload).map_err(|err| {
                RepoError::InvalidData(format!("malformed payload for `{name}`: {err}"))
            })?;
            document.insert(kind.as_str().to_string(), value);
        }

        if document.is_empty() {
            return Ok(None);
        }

        if let Some(missing) = CollectionKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required())
            .find(|kind| !document.contains_key(kind.as_str()))
        {
            return Err(RepoError::InvalidData(format!(
                "snapshot is missing collection `{}`",
                missing.as_str()
            )));
        }

        if !document.contains_key(CollectionKind::HistoryLogs.as_str()) {
            warn!("event=snapshot_load module=repo status=partial missing=historyLogs fallback=seed");
            document.insert(
                CollectionKind::HistoryLogs.as_str().to_string(),
                serde_json::to_value(seed_history(Utc::now()))?,
            );
        }

        let snapshot: Snapshot = serde_json::from_value(Value::Object(document))
            .map_err(|err| RepoError::InvalidData(format!("snapshot does not decode: {err}")))?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> RepoResult<()> {
        let Value::Object(collections) = serde_json::to_value(snapshot)? else {
            return Err(RepoError::InvalidData(
                "snapshot did not serialize to an object".to_string(),
            ));
        };

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM snapshot_collections;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO snapshot_collections (name, payload, record_count)
                 VALUES (?1, ?2, ?3);",
            )?;
            for kind in CollectionKind::ALL {
                let payload = collections.get(kind.as_str()).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "serialized snapshot lacks `{}`",
                        kind.as_str()
                    ))
                })?;
                insert.execute(params![
                    kind.as_str(),
                    payload.to_string(),
                    i64::try_from(snapshot.len_of(kind)).unwrap_or(i64::MAX),
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO snapshot_saves (id, saved_at, core_version, total_records)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                saved_at = excluded.saved_at,
                core_version = excluded.core_version,
                total_records = excluded.total_records;",
            params![
                Utc::now().timestamp_millis(),
                env!("CARGO_PKG_VERSION"),
                i64::try_from(snapshot.total_len()).unwrap_or(i64::MAX),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// Process-local gateway keeping the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    stored: Option<Snapshot>,
    save_count: usize,
}

impl InMemorySnapshotRepository {
    /// Empty gateway, as on a fresh install.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-loaded with a previously saved snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            stored: Some(snapshot),
            save_count: 0,
        }
    }

    pub fn stored(&self) -> Option<&Snapshot> {
        self.stored.as_ref()
    }

    /// Number of successful `save_all` calls.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl SnapshotGateway for InMemorySnapshotRepository {
    fn load_all(&self) -> RepoResult<Option<Snapshot>> {
        Ok(self.stored.clone())
    }

    fn save_all(&mut self, snapshot: &Snapshot) -> RepoResult<()> {
        self.stored = Some(snapshot.clone());
        self.save_count += 1;
        Ok(())
    }
}
