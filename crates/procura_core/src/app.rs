//! Application state: store, session, history and persistence wired together.
//!
//! # Responsibility
//! - Load-or-seed the store at startup and flush it on shutdown.
//! - Scope every tenant-tagged read and write to the logged-in user's company.
//! - Persist a full snapshot after each mutation batch.
//! - Queue user-visible notices; presenting them is the caller's job.
//!
//! # Invariants
//! - The in-memory store stays authoritative when a save fails; failures
//!   become `Notice::SaveFailed` and are not retried.
//! - A failed load never aborts startup; the seed is used instead.
//! - Exactly one save happens during a fresh-install bootstrap.
//! - The session holds a user id and is resolved against the store on use,
//!   so a removed user no longer acts.

use crate::config::AppConfig;
use crate::logging::init_logging;
use crate::model::audit::Audit;
use crate::model::history::{ActionKind, HistoryLog};
use crate::model::matrix::MatrixItem;
use crate::model::request::PurchaseRequest;
use crate::model::tenant::{generate_record_id, Company, Record, TenantScoped};
use crate::model::user::User;
use crate::model::validation::ValidationError;
use crate::repo::snapshot_repo::{
    RepoError, RepoResult, SnapshotGateway, SqliteSnapshotRepository,
};
use crate::seed::{seed_snapshot, PasswordHasher};
use crate::service::history_service::HistoryRecorder;
use crate::store::{Collection, EntityStore, Snapshot, StoreError, TenantWritable};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Operation needs a logged-in user.
    NotLoggedIn,
    UserNotFound(String),
    UserBlocked(String),
    DuplicateUserId(String),
    /// Tenant-scoped record lookup failed.
    RecordNotFound {
        collection: &'static str,
        id: String,
    },
    Store(StoreError),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoggedIn => write!(f, "no user is logged in"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::UserBlocked(id) => write!(f, "user is blocked: {id}"),
            Self::DuplicateUserId(id) => write!(f, "user id already exists: {id}"),
            Self::RecordNotFound { collection, id } => {
                write!(f, "{collection} record not found: {id}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// User-visible notification produced by core flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome {
        user_name: String,
        company_name: String,
    },
    UserCreated,
    UserRemoved,
    SessionEnded,
    /// Persisted data could not be read; defaults are in use.
    LoadFailed,
    /// Automatic save failed; in-memory data is unaffected.
    SaveFailed,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Self::Welcome { .. } | Self::UserCreated => NoticeLevel::Success,
            Self::UserRemoved | Self::SessionEnded => NoticeLevel::Info,
            Self::LoadFailed | Self::SaveFailed => NoticeLevel::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Welcome {
                user_name,
                company_name,
            } => {
                let first_name = user_name.split_whitespace().next().unwrap_or(user_name);
                format!("Welcome, {first_name}! ({company_name})")
            }
            Self::UserCreated => "User created.".to_string(),
            Self::UserRemoved => "User removed.".to_string(),
            Self::SessionEnded => "Session ended.".to_string(),
            Self::LoadFailed => "Failed to load data; using defaults.".to_string(),
            Self::SaveFailed => "Automatic save failed.".to_string(),
        }
    }
}

/// Explicit application state replacing ambient globals.
pub struct ProcuraApp<G: SnapshotGateway> {
    store: EntityStore,
    gateway: G,
    recorder: HistoryRecorder,
    session_user_id: Option<String>,
    notices: Vec<Notice>,
}

impl ProcuraApp<SqliteSnapshotRepository> {
    /// Starts logging (when configured), opens the snapshot database and
    /// bootstraps the app.
    ///
    /// # Errors
    /// - `Repo` when the snapshot database cannot be opened or migrated.
    pub fn open(config: &AppConfig, hasher: &dyn PasswordHasher) -> AppResult<Self> {
        if let Some(log_dir) = config.log_dir.as_deref() {
            if let Err(err) = init_logging(&config.log_level, log_dir) {
                eprintln!("procura: logging disabled: {err}");
            }
        }

        let gateway = match config.db_path.as_deref() {
            Some(path) => SqliteSnapshotRepository::open(path)?,
            None => SqliteSnapshotRepository::open_in_memory()?,
        };
        Ok(Self::bootstrap(gateway, hasher))
    }
}

impl<G: SnapshotGateway> ProcuraApp<G> {
    /// Loads the persisted snapshot, or seeds and saves defaults.
    pub fn bootstrap(mut gateway: G, hasher: &dyn PasswordHasher) -> Self {
        let started_at = Instant::now();
        info!("event=app_bootstrap module=app status=start");
        let mut notices = Vec::new();

        let (snapshot, source) = match gateway.load_all() {
            Ok(Some(snapshot)) => (snapshot, "persisted"),
            Ok(None) => {
                let seed = seed_snapshot(Utc::now(), hasher);
                if let Err(err) = gateway.save_all(&seed) {
                    error!(
                        "event=snapshot_save module=app status=error phase=bootstrap error={err}"
                    );
                    notices.push(Notice::SaveFailed);
                }
                (seed, "seed")
            }
            Err(err) => {
                warn!("event=snapshot_load module=app status=error fallback=seed error={err}");
                notices.push(Notice::LoadFailed);
                (seed_snapshot(Utc::now(), hasher), "fallback_seed")
            }
        };

        info!(
            "event=app_bootstrap module=app status=ok source={source} records={} duration_ms={}",
            snapshot.total_len(),
            started_at.elapsed().as_millis()
        );

        Self {
            store: EntityStore::from_snapshot(snapshot),
            gateway,
            recorder: HistoryRecorder::new(),
            session_user_id: None,
            notices,
        }
    }

    /// Flushes the store one last time and hands the gateway back.
    pub fn shutdown(mut self) -> (G, RepoResult<()>) {
        let flushed = self.gateway.save_all(self.store.snapshot());
        match &flushed {
            Ok(()) => info!("event=app_shutdown module=app status=ok"),
            Err(err) => error!("event=app_shutdown module=app status=error error={err}"),
        }
        (self.gateway, flushed)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Takes all queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ---- session ----

    /// Starts a session for `user_id` and records the login.
    ///
    /// # Errors
    /// - `UserNotFound` / `UserBlocked`.
    pub fn login(&mut self, user_id: &str) -> AppResult<&User> {
        let user = self
            .store
            .find::<User>(user_id)
            .cloned()
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        if user.is_blocked() {
            return Err(AppError::UserBlocked(user.id));
        }

        let company_name = self
            .store
            .find::<Company>(&user.company_id)
            .map_or_else(|| "Company".to_string(), |company| company.name.clone());
        self.notices.push(Notice::Welcome {
            user_name: user.name.clone(),
            company_name,
        });
        self.recorder.record_login(self.store.history_mut(), &user);
        self.session_user_id = Some(user.id.clone());
        info!("event=user_login module=app status=ok tenant={}", user.company_id);
        self.persist();

        self.current_user().ok_or(AppError::UserNotFound(user.id))
    }

    pub fn logout(&mut self) {
        if self.session_user_id.take().is_some() {
            self.notices.push(Notice::SessionEnded);
            info!("event=user_logout module=app status=ok");
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.session_user_id.as_deref()?;
        self.store.find::<User>(id)
    }

    /// Tenant of the logged-in user; blank when nobody is logged in.
    pub fn current_tenant_id(&self) -> &str {
        self.current_user().map_or("", |user| user.company_id.as_str())
    }

    pub fn current_company(&self) -> Option<&Company> {
        let tenant_id = self.current_user()?.company_id.as_str();
        self.store.find::<Company>(tenant_id)
    }

    // ---- tenant-scoped data ----

    /// Current tenant's records of `T`; empty when logged out.
    pub fn tenant_view<T: Collection + TenantScoped>(&self) -> Vec<T> {
        self.store.tenant_view(self.current_tenant_id())
    }

    /// Replaces the current tenant's records of `T` and persists.
    ///
    /// History is not writable this way; it only grows through
    /// [`ProcuraApp::log_action`] and the flows that record entries.
    ///
    /// # Errors
    /// - `NotLoggedIn`, or the store rejection for foreign, blank-id or
    ///   duplicate-id records.
    pub fn set_tenant_slice<T: TenantWritable>(&mut self, slice: Vec<T>) -> AppResult<()> {
        let tenant_id = self.require_tenant()?;
        self.store.set_tenant_slice(&tenant_id, slice)?;
        self.persist();
        Ok(())
    }

    /// Derives the current tenant's records of `T` from the current ones and
    /// persists.
    ///
    /// # Errors
    /// Same as [`ProcuraApp::set_tenant_slice`].
    pub fn update_tenant_slice<T, F>(&mut self, update: F) -> AppResult<()>
    where
        T: TenantWritable,
        F: FnOnce(Vec<T>) -> Vec<T>,
    {
        let tenant_id = self.require_tenant()?;
        self.store.update_tenant_slice(&tenant_id, update)?;
        self.persist();
        Ok(())
    }

    /// Records a tracked action by the logged-in user and persists.
    ///
    /// Logged out: nothing is recorded and `None` is returned.
    pub fn log_action(
        &mut self,
        action: ActionKind,
        target: impl Into<String>,
        details: impl Into<String>,
        item_id: Option<&str>,
    ) -> Option<HistoryLog> {
        let entry = self.record(action, target, details, item_id)?;
        self.persist();
        Some(entry)
    }

    /// Current tenant's history, most recent first.
    pub fn history(&self) -> Vec<HistoryLog> {
        self.tenant_view::<HistoryLog>()
    }

    // ---- workflows ----

    /// Adds a budget line for the current tenant and logs its creation.
    ///
    /// A blank id is replaced by a generated one.
    pub fn add_audit(&mut self, mut audit: Audit) -> AppResult<()> {
        let tenant_id = self.require_tenant()?;
        let actor_name = self.actor_name();
        if audit.id.is_empty() {
            audit.id = generate_record_id("a");
        }
        audit.company_id = tenant_id.clone();
        audit.validate()?;
        audit.stamp.touch(&actor_name);
        let target = format!("Planning: {}", audit.title);
        let item_id = audit.id.clone();

        self.store.update_tenant_slice::<Audit, _>(&tenant_id, |mut mine| {
            mine.push(audit);
            mine
        })?;
        self.record(
            ActionKind::Create,
            target,
            "Created a new budget planning record",
            Some(&item_id),
        );
        self.persist();
        Ok(())
    }

    /// Approves or rejects a purchase request of the current tenant.
    ///
    /// # Errors
    /// - `RecordNotFound` when the id is not in the tenant's requests.
    pub fn decide_request(&mut self, request_id: &str, approved: bool) -> AppResult<()> {
        let tenant_id = self.require_tenant()?;
        let actor_name = self.actor_name();
        let mut requests = self.store.tenant_view::<PurchaseRequest>(&tenant_id);
        let request = requests
            .iter_mut()
            .find(|request| request.id == request_id)
            .ok_or_else(|| AppError::RecordNotFound {
                collection: "requests",
                id: request_id.to_string(),
            })?;
        request.decide(approved, &actor_name);
        let target = format!("Request: {}", request.item);

        self.store.set_tenant_slice(&tenant_id, requests)?;
        let (action, details) = if approved {
            (ActionKind::Approve, "Approved purchase request")
        } else {
            (ActionKind::Reject, "Rejected purchase request")
        };
        self.record(action, target, details, Some(request_id));
        self.persist();
        Ok(())
    }

    /// Sets the executed amount of one month on a matrix item.
    ///
    /// # Errors
    /// - `RecordNotFound` for unknown ids, `Validation` for bad months.
    pub fn record_matrix_execution(
        &mut self,
        item_id: &str,
        month: u8,
        amount: f64,
    ) -> AppResult<()> {
        let tenant_id = self.require_tenant()?;
        let actor_name = self.actor_name();
        let mut items = self.store.tenant_view::<MatrixItem>(&tenant_id);
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AppError::RecordNotFound {
                collection: "matrixItems",
                id: item_id.to_string(),
            })?;
        item.record_execution(month, amount)?;
        item.stamp.touch(&actor_name);
        let target = format!("Matrix: {}", item.description);

        self.store.set_tenant_slice(&tenant_id, items)?;
        self.record(
            ActionKind::Update,
            target,
            format!("Executed value for month {} set to {amount}", month + 1),
            Some(item_id),
        );
        self.persist();
        Ok(())
    }

    // ---- administration (tenant-unaware) ----

    /// Appends a new user to the global user list.
    ///
    /// # Errors
    /// - `Validation` for invalid records, `DuplicateUserId` for reused ids.
    pub fn register_user(&mut self, user: User) -> AppResult<()> {
        user.validate()?;
        if self.store.find::<User>(&user.id).is_some() {
            return Err(AppError::DuplicateUserId(user.id));
        }
        let mut users = self.store.collection::<User>().to_vec();
        info!(
            "event=user_register module=app status=ok tenant={}",
            user.company_id
        );
        users.push(user);
        self.store.replace_collection(users);
        self.notices.push(Notice::UserCreated);
        self.persist();
        Ok(())
    }

    /// Removes exactly the user with `user_id` and logs the removal when an
    /// actor is logged in.
    ///
    /// # Errors
    /// - `UserNotFound` when no user has this id; nothing changes then.
    pub fn delete_user(&mut self, user_id: &str) -> AppResult<User> {
        let actor = self.current_user().cloned();
        let removed = self
            .store
            .remove_by_id::<User>(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        self.notices.push(Notice::UserRemoved);

        if let Some(actor) = actor.as_ref() {
            self.recorder.record(
                self.store.history_mut(),
                Some(actor),
                ActionKind::Delete,
                format!("User: {}", removed.name),
                "Administrator removed the user from the system",
                Some(user_id),
            );
        }
        if self.session_user_id.as_deref() == Some(user_id) {
            self.session_user_id = None;
        }
        info!(
            "event=user_delete module=app status=ok tenant={}",
            removed.company_id
        );
        self.persist();
        Ok(removed)
    }

    /// Stores a new password hash and clears the forced-reset flag.
    pub fn update_user_password(
        &mut self,
        user_id: &str,
        password_hash: String,
    ) -> AppResult<()> {
        let mut users = self.store.collection::<User>().to_vec();
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        user.password = Some(password_hash);
        user.must_change_password = false;
        self.store.replace_collection(users);
        self.persist();
        Ok(())
    }

    /// Overwrites the global user list.
    pub fn set_users(&mut self, users: Vec<User>) -> AppResult<()> {
        users.iter().try_for_each(|user| user.validate())?;
        self.store.replace_collection(users);
        self.persist();
        Ok(())
    }

    /// Overwrites the company list.
    pub fn set_companies(&mut self, companies: Vec<Company>) -> AppResult<()> {
        companies.iter().try_for_each(|company| company.validate())?;
        self.store.replace_collection(companies);
        self.persist();
        Ok(())
    }

    // ---- persistence ----

    /// Saves the full snapshot; returns whether the save succeeded.
    pub fn persist(&mut self) -> bool {
        match self.gateway.save_all(self.store.snapshot()) {
            Ok(()) => {
                debug!(
                    "event=snapshot_save module=app status=ok records={}",
                    self.store.snapshot().total_len()
                );
                true
            }
            Err(err) => {
                error!("event=snapshot_save module=app status=error error={err}");
                self.notices.push(Notice::SaveFailed);
                false
            }
        }
    }

    fn record(
        &mut self,
        action: ActionKind,
        target: impl Into<String>,
        details: impl Into<String>,
        item_id: Option<&str>,
    ) -> Option<HistoryLog> {
        let actor = self.current_user().cloned();
        self.recorder.record(
            self.store.history_mut(),
            actor.as_ref(),
            action,
            target,
            details,
            item_id,
        )
    }

    fn require_tenant(&self) -> AppResult<String> {
        self.current_user()
            .map(|user| user.company_id.clone())
            .ok_or(AppError::NotLoggedIn)
    }

    fn actor_name(&self) -> String {
        self.current_user()
            .map(|user| user.name.clone())
            .unwrap_or_default()
    }
}
