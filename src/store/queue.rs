//! Pending update queue
//!
//! Entries are grouped per project and ordered by a per-project sequence
//! number. The queue is read one project at a time: the first project by name
//! that has anything pending, together with every version waiting for it.

use rusqlite::Connection;
use tracing::debug;

use crate::store::error::RegistryError;
use crate::store::projects::ProjectStore;
use crate::store::types::PendingBundle;

/// Queue operations over a borrowed connection.
///
/// `enqueue` issues two statements, so callers run it inside a transaction.
pub struct UpdateQueue<'c> {
    conn: &'c Connection,
}

impl<'c> UpdateQueue<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Append `version` to the project's sub-queue
    pub fn enqueue(&self, project: &str, version: &str) -> Result<(), RegistryError> {
        let seq = self.next_sequence(project)?;

        self.conn.execute(
            "INSERT INTO pending_updates (project, seq, version) VALUES (?1, ?2, ?3)",
            (project, seq, version),
        )?;

        debug!("Queued {} for {} (seq {})", version, project, seq);
        Ok(())
    }

    /// Bump and return the project's counter. The counter is never reset, so
    /// sequence numbers are not reused after a clear.
    fn next_sequence(&self, project: &str) -> Result<i64, RegistryError> {
        let seq = self.conn.query_row(
            r#"
            INSERT INTO queue_sequences (project, last_seq)
            VALUES (?1, 1)
            ON CONFLICT(project) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
            [project],
            |row| row.get(0),
        )?;

        Ok(seq)
    }

    /// The first project by name with pending entries, carrying all of them in
    /// the order they were queued.
    pub fn first_bundle(&self) -> Result<PendingBundle, RegistryError> {
        let first: Option<String> = self
            .conn
            .query_row("SELECT MIN(project) FROM pending_updates", [], |row| {
                row.get(0)
            })?;
        let Some(name) = first else {
            return Err(RegistryError::ProjectNotFound(None));
        };

        let url = ProjectStore::new(self.conn)
            .url(&name)?
            .ok_or_else(|| RegistryError::ProjectNotFound(Some(name.clone())))?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM pending_updates WHERE project = ?1 ORDER BY seq")?;
        let versions = stmt
            .query_map([&name], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(PendingBundle {
            name,
            url,
            versions,
        })
    }

    /// Drop the whole sub-queue for `project`.
    ///
    /// A project with nothing pending has no sub-queue, which is reported as
    /// `IncompatibleQueueState` instead of being ignored.
    pub fn clear_project(&self, project: &str) -> Result<(), RegistryError> {
        let removed = self
            .conn
            .execute("DELETE FROM pending_updates WHERE project = ?1", [project])?;

        if removed == 0 {
            return Err(RegistryError::IncompatibleQueueState(project.to_string()));
        }

        debug!("Cleared {} pending updates for {}", removed, project);
        Ok(())
    }
}
