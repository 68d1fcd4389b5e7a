use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::store::codec::VersionKey;
use crate::store::error::RegistryError;
use crate::store::projects::ProjectStore;
use crate::store::queue::UpdateQueue;
use crate::store::schema::{configure, create_schema};
use crate::store::types::{PendingBundle, Project};

/// Project registry backed by a SQLite file.
///
/// Recording a version and queueing its notice always happen in the same
/// write transaction.
pub struct Registry {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Registry {
    pub fn new(db_path: &Path, busy_timeout_ms: u64) -> Result<Self, RegistryError> {
        info!("Opening registry database at {:?}", db_path);

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        configure(&conn, Duration::from_millis(busy_timeout_ms))?;
        create_schema(&conn)?;

        debug!("Registry initialized successfully");
        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path.to_path_buf(),
        })
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, RegistryError> {
        self.conn.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start tracking `name`, or point it at a new URL
    pub fn register_project(&self, name: &str, url: &str) -> Result<(), RegistryError> {
        let conn = self.lock_conn()?;
        ProjectStore::new(&conn).add_project(name, url)
    }

    pub fn has_project(&self, name: &str) -> Result<bool, RegistryError> {
        let conn = self.lock_conn()?;
        ProjectStore::new(&conn).has_project(name)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, RegistryError> {
        let conn = self.lock_conn()?;
        ProjectStore::new(&conn).list_projects()
    }

    /// Record an observed version and queue a notice for it.
    ///
    /// Fails with `BadVersion` before touching the database, and with
    /// `ProjectNotFound` (leaving nothing written) for an unknown project.
    pub fn record_version_update(
        &self,
        name: &str,
        raw_version: &str,
    ) -> Result<(), RegistryError> {
        let key = VersionKey::parse(raw_version)?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        ProjectStore::new(&tx).set_version(name, &key)?;
        UpdateQueue::new(&tx).enqueue(name, &key.render())?;

        tx.commit()?;

        info!("Recorded version {} for {}", key, name);
        Ok(())
    }

    /// Pending versions of the first project (by name) that has any
    pub fn peek_next_update(&self) -> Result<PendingBundle, RegistryError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let bundle = UpdateQueue::new(&tx).first_bundle()?;
        tx.commit()?;

        Ok(bundle)
    }

    /// Forget every pending notice for `name`
    pub fn acknowledge_updates(&self, name: &str) -> Result<(), RegistryError> {
        let conn = self.lock_conn()?;
        UpdateQueue::new(&conn).clear_project(name)?;

        debug!("Acknowledged updates for {}", name);
        Ok(())
    }
}
